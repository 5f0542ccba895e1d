//! Capabilities the binding layer provides.
//!
//! Loading libraries and resolving symbols happen outside this crate. The
//! binding layer hands us a [`LibraryBinding`] per loaded library and a
//! [`SymbolResolver`] that turns names and struct handles into addresses.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::{FfiError, Result};

/// How the binding layer classifies a library attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// A compiled native function wrapper.
    NativeFunction,
    /// Anything else (constants, globals, nested namespaces).
    Other,
}

/// A named attribute of a loaded library object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryAttribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl LibraryAttribute {
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::NativeFunction,
        }
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Other,
        }
    }
}

/// A loaded native library object.
pub trait LibraryBinding {
    /// Every named attribute of the library object.
    fn attributes(&self) -> Vec<LibraryAttribute>;

    /// Default textual representation, `<Lib object for 'NAME'>`.
    fn repr(&self) -> String;

    /// Canonical library name, when the binding layer knows it directly.
    fn canonical_name(&self) -> Option<String> {
        None
    }

    /// Names of the attributes that are native function wrappers.
    fn enumerate_exported_functions(&self) -> BTreeSet<String> {
        self.attributes()
            .into_iter()
            .filter(|attr| attr.kind == AttributeKind::NativeFunction)
            .map(|attr| attr.name)
            .collect()
    }
}

/// An address in native memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativePointer {
    pub address: u64,
}

impl NativePointer {
    pub fn new(address: u64) -> Self {
        Self { address }
    }

    pub fn is_null(&self) -> bool {
        self.address == 0
    }
}

impl fmt::Display for NativePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.address)
    }
}

/// Runtime handle to a struct pointer value, as the binding layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructPointerHandle {
    /// C name of the struct pointed to.
    pub cname: String,
    /// Opaque runtime token of the handle.
    pub token: u64,
}

/// External symbol resolution.
pub trait SymbolResolver {
    /// Address of the callable native symbol `name` in `library`.
    fn func_pointer(&self, library: &str, name: &str) -> Result<NativePointer>;

    /// Native pointer held by a struct-pointer handle.
    fn struct_pointer(&self, handle: &StructPointerHandle) -> Result<NativePointer>;
}

/// In-memory [`SymbolResolver`] backed by explicit address tables.
///
/// Useful when symbols come from an already linked image or from a
/// declaration that lists fixed addresses.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    functions: HashMap<(String, String), NativePointer>,
    structs: HashMap<u64, NativePointer>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the address of `library::name`.
    pub fn insert_function(&mut self, library: &str, name: &str, address: u64) {
        self.functions.insert(
            (library.to_string(), name.to_string()),
            NativePointer::new(address),
        );
    }

    /// Record the pointer behind a struct-pointer handle token.
    pub fn insert_struct(&mut self, token: u64, address: u64) {
        self.structs.insert(token, NativePointer::new(address));
    }
}

impl SymbolResolver for SymbolTable {
    fn func_pointer(&self, library: &str, name: &str) -> Result<NativePointer> {
        self.functions
            .get(&(library.to_string(), name.to_string()))
            .copied()
            .ok_or_else(|| FfiError::Resolver {
                detail: format!("no address for {library}::{name}"),
            })
    }

    fn struct_pointer(&self, handle: &StructPointerHandle) -> Result<NativePointer> {
        self.structs
            .get(&handle.token)
            .copied()
            .ok_or_else(|| FfiError::Resolver {
                detail: format!("no pointer for {} handle {}", handle.cname, handle.token),
            })
    }
}
