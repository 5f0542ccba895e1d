//! The cbridge type universe.
//!
//! Holds the host compiler's base vocabulary (primitives, the canonical
//! opaque pointer, buffers) together with the bridge variants that model
//! externally described native libraries: library handles, FFI sessions,
//! by-value structs, and native pointers with ownership.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod native;

pub use native::{
    FfiSessionType, NativeLibraryType, NativePointerType, Ownership, PointerKind, SessionId,
    StructDescriptor, StructField, StructValueType,
};

/// Signedness of an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signedness {
    Signed,
    Unsigned,
}

/// IEEE 754 floating-point precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FloatPrecision {
    F32,
    F64,
}

impl FloatPrecision {
    /// Width of one component in bits.
    pub fn bits(&self) -> u8 {
        match self {
            FloatPrecision::F32 => 32,
            FloatPrecision::F64 => 64,
        }
    }
}

/// The core type representation.
///
/// Equality and hashing follow each variant's identity key, so a
/// [`TypeRegistry`](crate::registry::TypeRegistry) can intern values
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    // === Primitives ===
    /// No value.
    Void,
    /// Boolean: {true, false}.
    Bool,
    /// Integer with explicit width and signedness.
    Int { width: u8, signedness: Signedness },
    /// IEEE 754 floating-point with explicit precision.
    Float { precision: FloatPrecision },
    /// Complex number whose components have the given precision.
    Complex { precision: FloatPrecision },

    // === Host pointers and buffers ===
    /// The canonical opaque pointer (`void*`).
    VoidPtr,
    /// A host-level raw pointer with no ownership tracking.
    Pointer(Box<Type>),
    /// An array-like buffer of `element`.
    Buffer { element: Box<Type>, contiguous: bool },
    /// A named type reference (resolved by the host).
    Named(String),

    // === Native bridge ===
    /// A loaded native library.
    Library(NativeLibraryType),
    /// An FFI session marker.
    Session(FfiSessionType),
    /// A by-value instance of a native struct.
    StructValue(StructValueType),
    /// A typed pointer into native memory (raw or struct reference).
    NativePointer(NativePointerType),
}

/// A call signature: argument types and return type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub args: Vec<Type>,
    pub ret: Type,
}

impl Signature {
    pub fn new(args: Vec<Type>, ret: Type) -> Self {
        Self { args, ret }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// The call signatures a type exposes when used as a callee.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallSignatures {
    /// Fixed signatures, in declaration order.
    pub signatures: Vec<Signature>,
    /// Whether variadic use is tolerated.
    pub variadic: bool,
}

// === Convenience constructors ===

impl Type {
    pub fn i8() -> Self {
        Type::Int {
            width: 8,
            signedness: Signedness::Signed,
        }
    }
    pub fn i16() -> Self {
        Type::Int {
            width: 16,
            signedness: Signedness::Signed,
        }
    }
    pub fn i32() -> Self {
        Type::Int {
            width: 32,
            signedness: Signedness::Signed,
        }
    }
    pub fn i64() -> Self {
        Type::Int {
            width: 64,
            signedness: Signedness::Signed,
        }
    }
    pub fn u8() -> Self {
        Type::Int {
            width: 8,
            signedness: Signedness::Unsigned,
        }
    }
    pub fn u16() -> Self {
        Type::Int {
            width: 16,
            signedness: Signedness::Unsigned,
        }
    }
    pub fn u32() -> Self {
        Type::Int {
            width: 32,
            signedness: Signedness::Unsigned,
        }
    }
    pub fn u64() -> Self {
        Type::Int {
            width: 64,
            signedness: Signedness::Unsigned,
        }
    }
    pub fn f32() -> Self {
        Type::Float {
            precision: FloatPrecision::F32,
        }
    }
    pub fn f64() -> Self {
        Type::Float {
            precision: FloatPrecision::F64,
        }
    }
    pub fn complex64() -> Self {
        Type::Complex {
            precision: FloatPrecision::F32,
        }
    }
    pub fn complex128() -> Self {
        Type::Complex {
            precision: FloatPrecision::F64,
        }
    }

    /// A contiguous buffer of `element`.
    pub fn buffer(element: Type) -> Self {
        Type::Buffer {
            element: Box::new(element),
            contiguous: true,
        }
    }

    /// A borrowed native pointer to `pointee`.
    pub fn native_ptr(pointee: Type) -> Self {
        Type::NativePointer(NativePointerType::new(pointee, Ownership::Borrowed))
    }

    /// An owning native pointer to `pointee`.
    pub fn owning_ptr(pointee: Type) -> Self {
        Type::NativePointer(NativePointerType::new(pointee, Ownership::Owning))
    }

    /// Check if this type is a primitive scalar.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Type::Void | Type::Bool | Type::Int { .. } | Type::Float { .. } | Type::Complex { .. }
        )
    }

    /// Whether values of this type are addresses.
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            Type::VoidPtr | Type::Pointer(_) | Type::NativePointer(_)
        )
    }

    /// Whether this is one of the native bridge variants.
    pub fn is_native(&self) -> bool {
        matches!(
            self,
            Type::Library(_) | Type::Session(_) | Type::StructValue(_) | Type::NativePointer(_)
        )
    }

    /// The struct-reference pointer this type denotes, if any.
    pub fn as_struct_ref(&self) -> Option<&NativePointerType> {
        match self {
            Type::NativePointer(ptr) if ptr.is_struct_ref() => Some(ptr),
            _ => None,
        }
    }

    /// The call signatures this type exposes as a callee.
    ///
    /// Only sessions answer; every other type is not callable here.
    pub fn call_signatures(&self) -> Option<CallSignatures> {
        match self {
            Type::Session(session) => Some(session.call_signatures()),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Bool => write!(f, "bool"),
            Type::Int { width, signedness } => {
                let prefix = match signedness {
                    Signedness::Signed => "int",
                    Signedness::Unsigned => "uint",
                };
                write!(f, "{prefix}{width}")
            }
            Type::Float { precision } => write!(f, "float{}", precision.bits()),
            Type::Complex { precision } => write!(f, "complex{}", u16::from(precision.bits()) * 2),
            Type::VoidPtr => write!(f, "voidptr"),
            Type::Pointer(inner) => write!(f, "{inner}*"),
            Type::Buffer {
                element,
                contiguous,
            } => {
                let layout = if *contiguous { "C" } else { "A" };
                write!(f, "buffer({element}, {layout})")
            }
            Type::Named(name) => write!(f, "{name}"),
            Type::Library(lib) => write!(f, "{lib}"),
            Type::Session(session) => write!(f, "{session}"),
            Type::StructValue(value) => write!(f, "{value}"),
            Type::NativePointer(ptr) => write!(f, "{ptr}"),
        }
    }
}
