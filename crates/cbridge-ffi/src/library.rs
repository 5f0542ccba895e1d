//! Native library handle construction and function lookup.

use cbridge_core::NativeLibraryType;

use crate::binding::{LibraryBinding, NativePointer, SymbolResolver};
use crate::error::{FfiError, Result};

const REPR_PREFIX: &str = "<Lib object for '";
const REPR_SUFFIX: &str = "'>";

/// Extract `NAME` from a representation starting with
/// `<Lib object for 'NAME'>`.
///
/// Text after the closing `'>` is ignored. `NAME` must be non-empty and
/// contain no single quote.
pub fn parse_library_repr(repr: &str) -> Option<&str> {
    let rest = repr.strip_prefix(REPR_PREFIX)?;
    let end = rest.find('\'')?;
    let name = &rest[..end];
    if name.is_empty() || !rest[end..].starts_with(REPR_SUFFIX) {
        return None;
    }
    Some(name)
}

/// Build the library type for a loaded library object.
///
/// Equivalent to [`library_type_with`] with the textual fallback allowed.
pub fn library_type(binding: &dyn LibraryBinding) -> Result<NativeLibraryType> {
    library_type_with(binding, true)
}

/// Build the library type for a loaded library object.
///
/// The typed canonical name wins when the binding provides one. Otherwise,
/// if `allow_repr_fallback` is set, the name is parsed out of the default
/// textual representation.
pub fn library_type_with(
    binding: &dyn LibraryBinding,
    allow_repr_fallback: bool,
) -> Result<NativeLibraryType> {
    let name = match binding.canonical_name().filter(|name| !name.is_empty()) {
        Some(name) => name,
        None => {
            let repr = binding.repr();
            let parsed = if allow_repr_fallback {
                parse_library_repr(&repr).map(str::to_string)
            } else {
                None
            };
            match parsed {
                Some(name) => {
                    tracing::warn!(
                        library = %name,
                        "library name taken from textual representation"
                    );
                    name
                }
                None => return Err(FfiError::LibraryNameFormat { repr }),
            }
        }
    };

    let functions = binding.enumerate_exported_functions();
    tracing::debug!(library = %name, functions = functions.len(), "modelled native library");
    Ok(NativeLibraryType::new(name, functions))
}

/// Function-pointer lookup on a modelled library.
pub trait LibraryHandle {
    /// Resolve an exported function to its native address.
    ///
    /// Fails with [`FfiError::FunctionNotFound`] when the library does not
    /// export `name`; the resolver is not consulted in that case.
    fn get_func_pointer(&self, name: &str, resolver: &dyn SymbolResolver) -> Result<NativePointer>;
}

impl LibraryHandle for NativeLibraryType {
    fn get_func_pointer(&self, name: &str, resolver: &dyn SymbolResolver) -> Result<NativePointer> {
        if !self.has_func(name) {
            return Err(FfiError::FunctionNotFound {
                name: name.to_string(),
                library: self.name().to_string(),
            });
        }
        tracing::debug!(library = %self.name(), function = %name, "resolving function pointer");
        resolver.func_pointer(self.name(), name)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::binding::{LibraryAttribute, StructPointerHandle};

    struct MockLib {
        repr: &'static str,
        canonical: Option<&'static str>,
        functions: &'static [&'static str],
    }

    impl MockLib {
        fn with_repr(repr: &'static str, functions: &'static [&'static str]) -> Self {
            Self {
                repr,
                canonical: None,
                functions,
            }
        }
    }

    impl LibraryBinding for MockLib {
        fn attributes(&self) -> Vec<LibraryAttribute> {
            let mut attrs: Vec<_> = self
                .functions
                .iter()
                .map(|f| LibraryAttribute::function(*f))
                .collect();
            attrs.push(LibraryAttribute::other("__doc__"));
            attrs
        }

        fn repr(&self) -> String {
            self.repr.to_string()
        }

        fn canonical_name(&self) -> Option<String> {
            self.canonical.map(str::to_string)
        }
    }

    /// Counts calls and hands out a fixed address.
    struct CountingResolver {
        calls: Cell<usize>,
    }

    impl SymbolResolver for CountingResolver {
        fn func_pointer(&self, _library: &str, _name: &str) -> Result<NativePointer> {
            self.calls.set(self.calls.get() + 1);
            Ok(NativePointer::new(0x4000))
        }

        fn struct_pointer(&self, _handle: &StructPointerHandle) -> Result<NativePointer> {
            unreachable!("not used by library lookups")
        }
    }

    #[test]
    fn parse_repr_variants() {
        assert_eq!(parse_library_repr("<Lib object for 'libfoo'>"), Some("libfoo"));
        assert_eq!(
            parse_library_repr("<Lib object for '/usr/lib/libm.so.6'> trailing"),
            Some("/usr/lib/libm.so.6")
        );
        assert_eq!(parse_library_repr("<Lib object for ''>"), None);
        assert_eq!(parse_library_repr("<Lib object for 'libfoo'"), None);
        assert_eq!(parse_library_repr(" <Lib object for 'libfoo'>"), None);
        assert_eq!(parse_library_repr("<module 'libfoo'>"), None);
    }

    #[test]
    fn name_from_repr() {
        let lib = MockLib::with_repr("<Lib object for 'libfoo'>", &["f"]);
        assert_eq!(library_type(&lib).unwrap().name(), "libfoo");
    }

    #[test]
    fn bad_repr_is_name_format_error() {
        let lib = MockLib::with_repr("<CompiledFFI object at 0x7f>", &["f"]);
        let err = library_type(&lib).unwrap_err();
        match err {
            FfiError::LibraryNameFormat { repr } => {
                assert_eq!(repr, "<CompiledFFI object at 0x7f>")
            }
            other => panic!("expected LibraryNameFormat, got {other:?}"),
        }
    }

    #[test]
    fn canonical_name_wins_over_repr() {
        let lib = MockLib {
            repr: "<Lib object for 'from_repr'>",
            canonical: Some("typed"),
            functions: &[],
        };
        assert_eq!(library_type(&lib).unwrap().name(), "typed");
    }

    #[test]
    fn strict_mode_rejects_repr_fallback() {
        let lib = MockLib::with_repr("<Lib object for 'libfoo'>", &[]);
        assert!(matches!(
            library_type_with(&lib, false),
            Err(FfiError::LibraryNameFormat { .. })
        ));

        let typed = MockLib {
            repr: "opaque",
            canonical: Some("libfoo"),
            functions: &[],
        };
        assert_eq!(library_type_with(&typed, false).unwrap().name(), "libfoo");
    }

    #[test]
    fn mathlib_end_to_end() {
        let lib = MockLib::with_repr("<Lib object for 'mathlib'>", &["sin", "cos"]);
        let ty = library_type(&lib).unwrap();
        assert_eq!(ty.name(), "mathlib");
        assert!(ty.has_func("sin"));
        assert!(ty.has_func("cos"));
        assert!(!ty.has_func("tan"));
        assert!(!ty.has_func("__doc__"));

        let resolver = CountingResolver { calls: Cell::new(0) };
        assert_eq!(
            ty.get_func_pointer("sin", &resolver).unwrap(),
            NativePointer::new(0x4000)
        );
        match ty.get_func_pointer("tan", &resolver).unwrap_err() {
            FfiError::FunctionNotFound { name, library } => {
                assert_eq!(name, "tan");
                assert_eq!(library, "mathlib");
            }
            other => panic!("expected FunctionNotFound, got {other:?}"),
        }
        assert_eq!(resolver.calls.get(), 1);
    }

    #[test]
    fn not_found_message() {
        let ty = NativeLibraryType::new("mathlib", ["sin"]);
        let resolver = CountingResolver { calls: Cell::new(0) };
        let err = ty.get_func_pointer("tan", &resolver).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Function tan is not present in the library mathlib"
        );
    }

    #[test]
    fn lookup_fails_iff_not_exported() {
        let lib = MockLib::with_repr("<Lib object for 'ops'>", &["a", "b", "c"]);
        let ty = library_type(&lib).unwrap();
        let resolver = CountingResolver { calls: Cell::new(0) };
        for name in ["a", "b", "c", "d", "__doc__", ""] {
            assert_eq!(
                ty.get_func_pointer(name, &resolver).is_err(),
                !ty.has_func(name),
                "mismatch for {name:?}"
            );
        }
    }
}
