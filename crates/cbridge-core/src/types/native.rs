//! Native bridge type variants.
//!
//! Each value here is immutable once constructed. Identity (equality and
//! hashing) is defined per variant so the registry can intern them:
//!
//! - libraries by canonical name and exported-function set
//! - sessions by their issued [`SessionId`]
//! - struct values by descriptor
//! - pointers by `(pointee, ownership)` plus the raw/struct-ref kind tag

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::{CallSignatures, Type};

/// A loaded native library, seen as a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeLibraryType {
    name: String,
    functions: BTreeSet<String>,
}

impl NativeLibraryType {
    pub fn new<I, S>(name: impl Into<String>, functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            functions: functions.into_iter().map(Into::into).collect(),
        }
    }

    /// Canonical library name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `func_name` is one of the library's exported functions.
    pub fn has_func(&self, func_name: &str) -> bool {
        self.functions.contains(func_name)
    }

    /// Exported function names, sorted.
    pub fn functions(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(String::as_str)
    }
}

impl fmt::Display for NativeLibraryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "native_lib<{}>", self.name)
    }
}

/// Monotonically assigned identity of one FFI session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The FFI root/session object, seen as a type.
///
/// Carries no call signature of its own; two sessions are never the same
/// type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FfiSessionType {
    id: SessionId,
}

impl FfiSessionType {
    pub fn new(id: SessionId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// No fixed signatures, but variadic use is tolerated.
    pub fn call_signatures(&self) -> CallSignatures {
        CallSignatures {
            signatures: Vec::new(),
            variadic: true,
        }
    }
}

impl fmt::Display for FfiSessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FFI#{}", self.id)
    }
}

/// One field of a native struct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub ty: Type,
}

/// External definition of a C-like struct: its C name and field layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructDescriptor {
    /// C name, e.g. `struct Node`.
    pub cname: String,
    /// Fields in layout order.
    #[serde(default)]
    pub fields: Vec<StructField>,
}

impl StructDescriptor {
    pub fn new(cname: impl Into<String>) -> Self {
        Self {
            cname: cname.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push(StructField {
            name: name.into(),
            ty,
        });
        self
    }
}

/// A by-value instance of a native struct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructValueType {
    descriptor: StructDescriptor,
}

impl StructValueType {
    pub fn new(descriptor: StructDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &StructDescriptor {
        &self.descriptor
    }

    pub fn cname(&self) -> &str {
        &self.descriptor.cname
    }

    /// Type of the named field, if the descriptor declares it.
    pub fn field_type(&self, name: &str) -> Option<&Type> {
        self.descriptor
            .fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.ty)
    }
}

impl fmt::Display for StructValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<instance> ({})", self.descriptor.cname)
    }
}

/// Whether the holder of a pointer must release the pointee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    #[default]
    Borrowed,
    Owning,
}

impl Ownership {
    pub fn is_owning(&self) -> bool {
        matches!(self, Ownership::Owning)
    }
}

/// What a native pointer points into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerKind {
    /// Plain typed pointer.
    Raw,
    /// Reference into a struct.
    StructRef {
        /// Pointer type this reference was modelled from. Diagnostic only.
        #[serde(skip)]
        origin: Option<Box<NativePointerType>>,
    },
}

impl PartialEq for PointerKind {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl Eq for PointerKind {}

/// A typed pointer into native memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativePointerType {
    pointee: Box<Type>,
    ownership: Ownership,
    kind: PointerKind,
}

/// Identity key of a [`NativePointerType`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PointerKey<'a> {
    pub pointee: &'a Type,
    pub ownership: Ownership,
    pub struct_ref: bool,
}

impl NativePointerType {
    pub fn new(pointee: Type, ownership: Ownership) -> Self {
        Self {
            pointee: Box::new(pointee),
            ownership,
            kind: PointerKind::Raw,
        }
    }

    /// A borrowed raw pointer to `pointee`.
    pub fn borrowed(pointee: Type) -> Self {
        Self::new(pointee, Ownership::Borrowed)
    }

    /// A struct reference modelled from `origin`.
    ///
    /// Pointee and ownership are taken from `origin`, which is kept as a
    /// back-reference.
    pub fn struct_ref(origin: NativePointerType) -> Self {
        Self {
            pointee: origin.pointee.clone(),
            ownership: origin.ownership,
            kind: PointerKind::StructRef {
                origin: Some(Box::new(origin)),
            },
        }
    }

    pub fn pointee(&self) -> &Type {
        &self.pointee
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn is_owning(&self) -> bool {
        self.ownership.is_owning()
    }

    pub fn kind(&self) -> &PointerKind {
        &self.kind
    }

    pub fn is_struct_ref(&self) -> bool {
        matches!(self.kind, PointerKind::StructRef { .. })
    }

    /// The pointer type a struct reference was modelled from.
    pub fn origin(&self) -> Option<&NativePointerType> {
        match &self.kind {
            PointerKind::StructRef { origin } => origin.as_deref(),
            PointerKind::Raw => None,
        }
    }

    pub fn key(&self) -> PointerKey<'_> {
        PointerKey {
            pointee: &self.pointee,
            ownership: self.ownership,
            struct_ref: self.is_struct_ref(),
        }
    }
}

impl PartialEq for NativePointerType {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for NativePointerType {}

impl Hash for NativePointerType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for NativePointerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PointerKind::StructRef { .. } => write!(f, "Ref#{}", self.pointee),
            PointerKind::Raw => {
                write!(f, "<ffi>({}*)", self.pointee)?;
                if self.is_owning() {
                    write!(f, "(Owning)")?;
                }
                Ok(())
            }
        }
    }
}
