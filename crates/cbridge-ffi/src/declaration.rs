//! Bridge declaration file (`.bridge.toml`) parsing.
//!
//! A `.bridge.toml` file describes a compiled native library the way the
//! binding layer sees it: its canonical name, exported functions with their
//! signatures, struct layouts, and type mappings for structs the host
//! already has a type for.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::binding::{LibraryAttribute, LibraryBinding};
use crate::error::{FfiError, Result};

/// A complete bridge declaration parsed from a `.bridge.toml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FfiDeclaration {
    /// Metadata about the native library.
    pub library: DeclaredLibrary,
    /// Exported functions.
    #[serde(default)]
    pub functions: Vec<DeclaredFunction>,
    /// Struct layouts.
    #[serde(default)]
    pub structs: Vec<DeclaredStruct>,
    /// Structs modelled as existing host types.
    #[serde(default, rename = "type-mappings")]
    pub type_mappings: Vec<TypeMapping>,
}

/// Metadata about the native library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclaredLibrary {
    /// Canonical library name (e.g., "cffi_usecases_ool").
    pub name: String,
    /// Non-function attributes the library object also exposes.
    #[serde(default)]
    pub globals: Vec<String>,
}

/// A single exported function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclaredFunction {
    /// Function name (must match the native symbol).
    pub name: String,
    /// Argument type names.
    #[serde(default)]
    pub args: Vec<String>,
    /// Return type name.
    #[serde(default = "default_ret")]
    pub ret: String,
    /// Whether this function is left out of the library's exports.
    #[serde(default)]
    pub excluded: bool,
}

fn default_ret() -> String {
    "void".to_string()
}

/// A struct layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclaredStruct {
    /// C name, e.g. `struct Node`.
    pub name: String,
    /// Typedef names that refer to this struct.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Fields in layout order.
    #[serde(default)]
    pub fields: Vec<DeclaredField>,
}

/// A struct field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclaredField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Model struct `cname` as the host type named `ty`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeMapping {
    #[serde(rename = "struct")]
    pub cname: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl FfiDeclaration {
    /// Parse a bridge declaration from a TOML string.
    pub fn parse(input: &str) -> Result<Self> {
        let decl: FfiDeclaration = toml::from_str(input).map_err(FfiError::Toml)?;

        if decl.library.name.is_empty() {
            return Err(FfiError::InvalidDeclaration {
                detail: "library.name is required".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for func in &decl.functions {
            if !seen.insert(func.name.as_str()) {
                return Err(FfiError::InvalidDeclaration {
                    detail: format!("function '{}' declared twice", func.name),
                });
            }
        }

        let mut seen = HashSet::new();
        for decl_struct in &decl.structs {
            if !seen.insert(decl_struct.name.as_str()) {
                return Err(FfiError::InvalidDeclaration {
                    detail: format!("struct '{}' declared twice", decl_struct.name),
                });
            }
        }

        Ok(decl)
    }

    /// Parse a bridge declaration from a file path.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Return only the non-excluded functions.
    pub fn active_functions(&self) -> Vec<&DeclaredFunction> {
        self.functions.iter().filter(|f| !f.excluded).collect()
    }

    /// Look up an active function by name.
    pub fn function(&self, name: &str) -> Option<&DeclaredFunction> {
        self.functions
            .iter()
            .find(|f| !f.excluded && f.name == name)
    }
}

impl LibraryBinding for FfiDeclaration {
    fn attributes(&self) -> Vec<LibraryAttribute> {
        self.active_functions()
            .into_iter()
            .map(|f| LibraryAttribute::function(f.name.as_str()))
            .chain(
                self.library
                    .globals
                    .iter()
                    .map(|g| LibraryAttribute::other(g.as_str())),
            )
            .collect()
    }

    fn repr(&self) -> String {
        format!("<Lib object for '{}'>", self.library.name)
    }

    fn canonical_name(&self) -> Option<String> {
        Some(self.library.name.clone())
    }

    fn enumerate_exported_functions(&self) -> BTreeSet<String> {
        self.active_functions()
            .into_iter()
            .map(|f| f.name.clone())
            .collect()
    }
}
