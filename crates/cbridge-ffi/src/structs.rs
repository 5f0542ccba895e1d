//! Struct descriptors and user type mappings.
//!
//! Structs are modelled as [`StructValueType`]s by default, and pointers to
//! them as struct references. A registered type mapping replaces the struct
//! with a host type instead (for example a `{double real; double imag;}`
//! struct with `complex128`).

use std::collections::{BTreeMap, HashMap};

use cbridge_core::{NativePointerType, Ownership, StructDescriptor, StructValueType, Type};

use crate::error::{FfiError, Result};

/// Registered struct descriptors, typedef aliases, and type mappings.
#[derive(Debug, Clone, Default)]
pub struct StructTypeMap {
    descriptors: BTreeMap<String, StructDescriptor>,
    aliases: HashMap<String, String>,
    mappings: HashMap<String, Type>,
}

impl StructTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a struct descriptor. Re-registering a name replaces it.
    pub fn register_struct(&mut self, descriptor: StructDescriptor) {
        tracing::debug!(
            cname = %descriptor.cname,
            fields = descriptor.fields.len(),
            "registered struct"
        );
        self.descriptors.insert(descriptor.cname.clone(), descriptor);
    }

    /// Make `alias` (a typedef name) refer to the struct `cname`.
    pub fn add_alias(&mut self, alias: impl Into<String>, cname: impl Into<String>) {
        self.aliases.insert(alias.into(), cname.into());
    }

    /// Model the struct `cname` as `ty` instead of a struct value.
    pub fn register_type(&mut self, cname: impl Into<String>, ty: Type) {
        let cname = cname.into();
        tracing::debug!(cname = %cname, ty = %ty, "registered struct type mapping");
        self.mappings.insert(cname, ty);
    }

    /// The C name `name` stands for, following typedef aliases.
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn descriptor(&self, name: &str) -> Option<&StructDescriptor> {
        self.descriptors.get(self.canonical(name))
    }

    /// Whether `name` is modelled as a host type rather than a struct value.
    pub fn is_mapped(&self, name: &str) -> bool {
        self.mappings.contains_key(self.canonical(name))
    }

    pub fn is_known(&self, name: &str) -> bool {
        let cname = self.canonical(name);
        self.descriptors.contains_key(cname) || self.mappings.contains_key(cname)
    }

    /// Type of a by-value `name`.
    pub fn value_type(&self, name: &str) -> Result<Type> {
        let cname = self.canonical(name);
        if let Some(mapped) = self.mappings.get(cname) {
            return Ok(mapped.clone());
        }
        self.descriptors
            .get(cname)
            .map(|descriptor| Type::StructValue(StructValueType::new(descriptor.clone())))
            .ok_or_else(|| FfiError::UnknownStruct {
                cname: cname.to_string(),
            })
    }

    /// Type of a pointer to `name`.
    ///
    /// Mapped structs give a raw pointer to the mapped type; everything else
    /// gives a struct reference whose origin is the raw pointer to the value.
    pub fn pointer_type(&self, name: &str, ownership: Ownership) -> Result<Type> {
        let cname = self.canonical(name);
        let pointee = self.value_type(cname)?;
        let raw = NativePointerType::new(pointee, ownership);
        if self.is_mapped(cname) {
            Ok(Type::NativePointer(raw))
        } else {
            Ok(Type::NativePointer(NativePointerType::struct_ref(raw)))
        }
    }

    /// Registered descriptors, sorted by C name.
    pub fn descriptors(&self) -> impl Iterator<Item = &StructDescriptor> {
        self.descriptors.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complex_struct() -> StructDescriptor {
        StructDescriptor::new("struct _numba_complex")
            .with_field("real", Type::f64())
            .with_field("imag", Type::f64())
    }

    #[test]
    fn unknown_struct() {
        let map = StructTypeMap::new();
        assert!(matches!(
            map.value_type("struct Missing"),
            Err(FfiError::UnknownStruct { .. })
        ));
        assert!(!map.is_known("struct Missing"));
    }

    #[test]
    fn value_and_pointer_of_plain_struct() {
        let mut map = StructTypeMap::new();
        map.register_struct(StructDescriptor::new("struct Node").with_field("value", Type::i32()));

        let value = map.value_type("struct Node").unwrap();
        assert_eq!(value.to_string(), "<instance> (struct Node)");

        let ptr = map.pointer_type("struct Node", Ownership::Borrowed).unwrap();
        let reference = ptr.as_struct_ref().unwrap();
        assert_eq!(reference.pointee(), &value);
        assert!(!reference.origin().unwrap().is_struct_ref());
        assert_eq!(ptr.to_string(), "Ref#<instance> (struct Node)");
    }

    #[test]
    fn owning_struct_pointer() {
        let mut map = StructTypeMap::new();
        map.register_struct(StructDescriptor::new("struct Head"));
        let owning = map.pointer_type("struct Head", Ownership::Owning).unwrap();
        let borrowed = map.pointer_type("struct Head", Ownership::Borrowed).unwrap();
        assert_ne!(owning, borrowed);
        assert!(owning.as_struct_ref().unwrap().is_owning());
    }

    #[test]
    fn mapping_overrides_struct() {
        let mut map = StructTypeMap::new();
        map.register_struct(complex_struct());
        map.register_type("struct _numba_complex", Type::complex128());

        assert_eq!(
            map.value_type("struct _numba_complex").unwrap(),
            Type::complex128()
        );
        let ptr = map
            .pointer_type("struct _numba_complex", Ownership::Borrowed)
            .unwrap();
        assert_eq!(ptr, Type::native_ptr(Type::complex128()));
        assert!(ptr.as_struct_ref().is_none());
    }

    #[test]
    fn mapping_without_descriptor() {
        let mut map = StructTypeMap::new();
        map.register_type("struct pair", Type::complex64());
        assert!(map.is_known("struct pair"));
        assert!(map.is_mapped("struct pair"));
        assert_eq!(map.value_type("struct pair").unwrap(), Type::complex64());
        assert!(map.descriptor("struct pair").is_none());
    }

    #[test]
    fn aliases_resolve_to_struct() {
        let mut map = StructTypeMap::new();
        map.register_struct(complex_struct());
        map.add_alias("numba_complex", "struct _numba_complex");
        assert_eq!(
            map.descriptor("numba_complex").unwrap().cname,
            "struct _numba_complex"
        );
        assert_eq!(
            map.value_type("numba_complex").unwrap(),
            map.value_type("struct _numba_complex").unwrap()
        );
    }
}
