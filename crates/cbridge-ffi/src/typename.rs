//! Resolution of declared type names.
//!
//! Declarations name types with a small fixed vocabulary rather than C
//! declarators: scalar names, `voidptr`, `struct NAME` or a registered
//! typedef alias, each followed by any number of `*`.
//!
//! Inside struct bodies the resolver runs in nominal mode: struct types are
//! referred to by name (`Type::Named`) so self-referential layouts such as
//! linked-list nodes stay finite. Structs with a type mapping resolve to the
//! mapped type in either mode.

use cbridge_core::{NativePointerType, Ownership, Type};

use crate::error::{FfiError, Result};
use crate::structs::StructTypeMap;

/// Resolves type names against the registered structs.
#[derive(Debug, Clone, Copy)]
pub struct TypeNameResolver<'a> {
    structs: &'a StructTypeMap,
    pointer_width: u8,
    nominal: bool,
}

enum Base {
    Scalar(Type),
    Struct(String),
}

impl<'a> TypeNameResolver<'a> {
    pub fn new(structs: &'a StructTypeMap, pointer_width: u8) -> Self {
        Self {
            structs,
            pointer_width,
            nominal: false,
        }
    }

    /// A resolver that refers to structs by name, for struct field types.
    pub fn nominal(structs: &'a StructTypeMap, pointer_width: u8) -> Self {
        Self {
            structs,
            pointer_width,
            nominal: true,
        }
    }

    /// Resolve `name`; pointers are borrowed.
    pub fn resolve(&self, name: &str) -> Result<Type> {
        self.resolve_with(name, Ownership::Borrowed)
    }

    /// Resolve `name`, giving the outermost pointer (if any) `ownership`.
    pub fn resolve_with(&self, name: &str, ownership: Ownership) -> Result<Type> {
        let trimmed = name.trim();
        let base_name = trimmed.trim_end_matches(|c: char| c == '*' || c.is_whitespace());
        let depth = trimmed[base_name.len()..]
            .chars()
            .filter(|c| *c == '*')
            .count();
        if base_name.is_empty() {
            return Err(invalid(name, "missing base type"));
        }

        let base = self.base(base_name).ok_or_else(|| invalid(name, "unknown type"))?;
        if depth == 0 {
            return match base {
                Base::Scalar(ty) => Ok(ty),
                Base::Struct(cname) if self.refers_by_name(&cname) => Ok(Type::Named(cname)),
                Base::Struct(cname) => self.structs.value_type(&cname),
            };
        }

        let ownership_at = |level: usize| {
            if level == depth {
                ownership
            } else {
                Ownership::Borrowed
            }
        };
        let mut ty = match base {
            Base::Scalar(Type::Void) => Type::VoidPtr,
            Base::Scalar(ty) => Type::NativePointer(NativePointerType::new(ty, ownership_at(1))),
            Base::Struct(cname) if self.refers_by_name(&cname) => {
                Type::NativePointer(NativePointerType::new(Type::Named(cname), ownership_at(1)))
            }
            Base::Struct(cname) => self.structs.pointer_type(&cname, ownership_at(1))?,
        };
        for level in 2..=depth {
            ty = Type::NativePointer(NativePointerType::new(ty, ownership_at(level)));
        }
        Ok(ty)
    }

    fn refers_by_name(&self, cname: &str) -> bool {
        self.nominal && !self.structs.is_mapped(cname)
    }

    fn base(&self, name: &str) -> Option<Base> {
        let ty = match name {
            "void" => Type::Void,
            "bool" | "_Bool" => Type::Bool,
            "i8" | "int8_t" | "char" => Type::i8(),
            "i16" | "int16_t" | "short" => Type::i16(),
            "i32" | "int32_t" | "int" => Type::i32(),
            "i64" | "int64_t" | "long long" => Type::i64(),
            "u8" | "uint8_t" => Type::u8(),
            "u16" | "uint16_t" => Type::u16(),
            "u32" | "uint32_t" => Type::u32(),
            "u64" | "uint64_t" => Type::u64(),
            "size_t" => {
                if self.pointer_width >= 64 {
                    Type::u64()
                } else {
                    Type::u32()
                }
            }
            "f32" | "float" => Type::f32(),
            "f64" | "double" => Type::f64(),
            "c64" => Type::complex64(),
            "c128" => Type::complex128(),
            "voidptr" => Type::VoidPtr,
            _ => {
                let normalized = normalize_struct_name(name)?;
                let cname = self.structs.canonical(&normalized).to_string();
                let accepted = self.structs.is_known(&cname)
                    || (self.nominal && cname.starts_with("struct "));
                return accepted.then_some(Base::Struct(cname));
            }
        };
        Some(Base::Scalar(ty))
    }
}

/// `struct   Node` becomes `struct Node`; bare identifiers stay as they are
/// so typedef aliases can match.
fn normalize_struct_name(name: &str) -> Option<String> {
    let mut words = name.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("struct"), Some(tag), None) => Some(format!("struct {tag}")),
        (Some(ident), None, None) => Some(ident.to_string()),
        _ => None,
    }
}

fn invalid(name: &str, detail: &str) -> FfiError {
    FfiError::InvalidTypeName {
        name: name.to_string(),
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use cbridge_core::StructDescriptor;

    use super::*;

    fn structs() -> StructTypeMap {
        let mut map = StructTypeMap::new();
        map.register_struct(StructDescriptor::new("struct Node").with_field("value", Type::i32()));
        map.add_alias("Node", "struct Node");
        map.register_type("struct _numba_complex", Type::complex128());
        map.add_alias("numba_complex", "struct _numba_complex");
        map
    }

    #[test]
    fn scalars() {
        let map = structs();
        let names = TypeNameResolver::new(&map, 64);
        assert_eq!(names.resolve("double").unwrap(), Type::f64());
        assert_eq!(names.resolve(" int ").unwrap(), Type::i32());
        assert_eq!(names.resolve("bool").unwrap(), Type::Bool);
        assert_eq!(names.resolve("void").unwrap(), Type::Void);
        assert_eq!(names.resolve("c128").unwrap(), Type::complex128());
    }

    #[test]
    fn size_t_follows_pointer_width() {
        let map = structs();
        assert_eq!(TypeNameResolver::new(&map, 64).resolve("size_t").unwrap(), Type::u64());
        assert_eq!(TypeNameResolver::new(&map, 32).resolve("size_t").unwrap(), Type::u32());
    }

    #[test]
    fn scalar_pointers() {
        let map = structs();
        let names = TypeNameResolver::new(&map, 64);
        assert_eq!(names.resolve("float*").unwrap(), Type::native_ptr(Type::f32()));
        assert_eq!(names.resolve("void *").unwrap(), Type::VoidPtr);
        assert_eq!(
            names.resolve("double**").unwrap(),
            Type::native_ptr(Type::native_ptr(Type::f64()))
        );
    }

    #[test]
    fn ownership_applies_to_outermost_pointer() {
        let map = structs();
        let names = TypeNameResolver::new(&map, 64);
        let ty = names.resolve_with("int32_t**", Ownership::Owning).unwrap();
        match &ty {
            Type::NativePointer(outer) => {
                assert!(outer.is_owning());
                assert_eq!(outer.pointee(), &Type::native_ptr(Type::i32()));
            }
            other => panic!("expected native pointer, got {other:?}"),
        }
        assert_eq!(names.resolve_with("int", Ownership::Owning).unwrap(), Type::i32());
    }

    #[test]
    fn struct_pointers_are_references() {
        let map = structs();
        let names = TypeNameResolver::new(&map, 64);
        let by_tag = names.resolve("struct   Node*").unwrap();
        let by_alias = names.resolve("Node*").unwrap();
        assert_eq!(by_tag, by_alias);
        assert!(by_tag.as_struct_ref().is_some());

        let value = names.resolve("Node").unwrap();
        assert!(matches!(value, Type::StructValue(_)));
    }

    #[test]
    fn mapped_struct_pointer() {
        let map = structs();
        let names = TypeNameResolver::new(&map, 64);
        assert_eq!(
            names.resolve("numba_complex *").unwrap(),
            Type::native_ptr(Type::complex128())
        );
    }

    #[test]
    fn nominal_mode_names_structs() {
        let map = structs();
        let names = TypeNameResolver::nominal(&map, 64);
        assert_eq!(
            names.resolve("struct Node*").unwrap(),
            Type::native_ptr(Type::Named("struct Node".into()))
        );
        assert_eq!(
            names.resolve("Node").unwrap(),
            Type::Named("struct Node".into())
        );
        // Not registered yet, as in a self-referential struct body.
        assert_eq!(
            names.resolve("struct Tree*").unwrap(),
            Type::native_ptr(Type::Named("struct Tree".into()))
        );
        assert!(names.resolve("Tree*").is_err());
        assert_eq!(names.resolve("double").unwrap(), Type::f64());
    }

    #[test]
    fn nominal_mode_uses_type_mappings() {
        let map = structs();
        let names = TypeNameResolver::nominal(&map, 64);
        assert_eq!(names.resolve("numba_complex").unwrap(), Type::complex128());
        assert_eq!(
            names.resolve("struct _numba_complex*").unwrap(),
            Type::native_ptr(Type::complex128())
        );
    }

    #[test]
    fn invalid_names() {
        let map = structs();
        let names = TypeNameResolver::new(&map, 64);
        for bad in ["", "*", "struct Missing*", "unsigned wobble", "double (*)(double)"] {
            assert!(
                matches!(names.resolve(bad), Err(FfiError::InvalidTypeName { .. })),
                "{bad:?} should be rejected"
            );
        }
    }
}
