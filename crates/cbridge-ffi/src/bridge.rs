//! Registration front door.
//!
//! A [`Bridge`] owns the type registry and everything registered into it
//! during a compilation session: libraries, sessions, structs, type
//! mappings, and declared function signatures.

use std::collections::{BTreeMap, HashMap};

use cbridge_core::{
    NativeLibraryType, NativePointerType, Ownership, Signature, StructDescriptor, StructField,
    Type, TypeId, TypeRegistry,
};

use crate::binding::{LibraryBinding, NativePointer, StructPointerHandle, SymbolResolver};
use crate::config::BridgeConfig;
use crate::declaration::FfiDeclaration;
use crate::error::{FfiError, Result};
use crate::library::{library_type_with, LibraryHandle};
use crate::pointer::StructPointerAccess;
use crate::session::{SessionRegistry, SessionToken};
use crate::structs::StructTypeMap;
use crate::typename::TypeNameResolver;

/// A compiled module as the binding layer exposes it: a library object plus
/// the FFI session it was built with.
pub trait ModuleBinding {
    fn library(&self) -> &dyn LibraryBinding;
    fn session_token(&self) -> SessionToken;
}

/// Type ids produced by registering a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisteredModule {
    pub library: TypeId,
    pub session: TypeId,
}

/// Registration state of the native type bridge.
#[derive(Debug, Default)]
pub struct Bridge {
    config: BridgeConfig,
    types: TypeRegistry,
    sessions: SessionRegistry,
    structs: StructTypeMap,
    libraries: BTreeMap<String, TypeId>,
    signatures: HashMap<(String, String), Signature>,
}

impl Bridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn structs(&self) -> &StructTypeMap {
        &self.structs
    }

    /// Resolve an interned type id.
    pub fn type_of(&self, id: TypeId) -> Result<&Type> {
        Ok(self.types.resolve(id)?)
    }

    /// Model a loaded library and intern its type.
    pub fn register_library(&mut self, binding: &dyn LibraryBinding) -> Result<TypeId> {
        let lib = library_type_with(binding, self.config.allow_repr_fallback)?;
        Ok(self.insert_library(lib))
    }

    fn insert_library(&mut self, lib: NativeLibraryType) -> TypeId {
        let name = lib.name().to_string();
        let id = self.types.intern(Type::Library(lib));
        tracing::info!(library = %name, %id, "registered native library");
        self.libraries.insert(name, id);
        id
    }

    /// Intern the session type issued for `token`.
    pub fn register_session(&mut self, token: SessionToken) -> TypeId {
        let session = self.sessions.register(token);
        self.types.intern(Type::Session(session))
    }

    /// Register a compiled module's library and session together.
    pub fn register_module(&mut self, module: &dyn ModuleBinding) -> Result<RegisteredModule> {
        let library = self.register_library(module.library())?;
        let session = self.register_session(module.session_token());
        Ok(RegisteredModule { library, session })
    }

    /// Register a struct descriptor and intern the type it is modelled as.
    pub fn register_struct(&mut self, descriptor: StructDescriptor) -> Result<TypeId> {
        let cname = descriptor.cname.clone();
        self.structs.register_struct(descriptor);
        let ty = self.structs.value_type(&cname)?;
        Ok(self.types.intern(ty))
    }

    /// Model struct `cname` as the host type `ty`.
    pub fn register_type(&mut self, cname: &str, ty: Type) -> TypeId {
        self.structs.register_type(cname, ty.clone());
        self.types.intern(ty)
    }

    /// Intern a native pointer to `pointee`.
    pub fn pointer_type(&mut self, pointee: Type, ownership: Ownership) -> TypeId {
        self.types
            .intern(Type::NativePointer(NativePointerType::new(pointee, ownership)))
    }

    /// Intern the type of a pointer to struct `cname`.
    pub fn struct_pointer_type(&mut self, cname: &str, ownership: Ownership) -> Result<TypeId> {
        let ty = self.structs.pointer_type(cname, ownership)?;
        Ok(self.types.intern(ty))
    }

    /// Register everything a declaration describes; returns the library type.
    ///
    /// The declaration is resolved in full before anything is recorded, so a
    /// failed registration leaves the bridge unchanged.
    pub fn register_declaration(&mut self, decl: &FfiDeclaration) -> Result<TypeId> {
        let width = self.config.pointer_width;
        let mut structs = self.structs.clone();

        for declared in &decl.structs {
            for alias in &declared.aliases {
                structs.add_alias(alias.as_str(), declared.name.as_str());
            }
        }

        // Mappings go first so fields of a mapped struct type take the mapped type.
        for mapping in &decl.type_mappings {
            let ty = TypeNameResolver::new(&structs, width).resolve(&mapping.ty)?;
            structs.register_type(mapping.cname.as_str(), ty);
        }

        for declared in &decl.structs {
            let names = TypeNameResolver::nominal(&structs, width);
            let fields = declared
                .fields
                .iter()
                .map(|field| -> Result<StructField> {
                    Ok(StructField {
                        name: field.name.clone(),
                        ty: names.resolve(&field.ty)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            structs.register_struct(StructDescriptor {
                cname: declared.name.clone(),
                fields,
            });
        }

        let lib = library_type_with(decl, self.config.allow_repr_fallback)?;
        let names = TypeNameResolver::new(&structs, width);
        let signatures = decl
            .active_functions()
            .into_iter()
            .map(|func| -> Result<(String, Signature)> {
                let args = func
                    .args
                    .iter()
                    .map(|arg| names.resolve(arg))
                    .collect::<Result<Vec<_>>>()?;
                let ret = names.resolve_with(&func.ret, self.config.result_ownership(&func.name))?;
                Ok((func.name.clone(), Signature::new(args, ret)))
            })
            .collect::<Result<Vec<_>>>()?;
        let value_types = decl
            .structs
            .iter()
            .map(|declared| declared.name.as_str())
            .chain(decl.type_mappings.iter().map(|mapping| mapping.cname.as_str()))
            .map(|cname| structs.value_type(cname))
            .collect::<Result<Vec<_>>>()?;

        self.structs = structs;
        for ty in value_types {
            self.types.intern(ty);
        }
        let lib_name = lib.name().to_string();
        let library = self.insert_library(lib);
        for (function, signature) in signatures {
            tracing::debug!(
                library = %lib_name,
                function = %function,
                %signature,
                "declared signature"
            );
            for ty in signature.args.iter().chain(std::iter::once(&signature.ret)) {
                self.types.intern(ty.clone());
            }
            self.signatures
                .insert((lib_name.clone(), function), signature);
        }
        Ok(library)
    }

    /// The library type registered under `name`.
    pub fn library(&self, name: &str) -> Option<&NativeLibraryType> {
        let id = self.libraries.get(name)?;
        match self.types.get(*id)? {
            Type::Library(lib) => Some(lib),
            _ => None,
        }
    }

    /// Declared signature of `library::function`.
    pub fn function_signature(&self, library: &str, function: &str) -> Option<&Signature> {
        self.signatures
            .get(&(library.to_string(), function.to_string()))
    }

    /// Resolve `library::function` to its native address.
    pub fn get_func_pointer(
        &self,
        library: &str,
        function: &str,
        resolver: &dyn SymbolResolver,
    ) -> Result<NativePointer> {
        let lib = self.library(library).ok_or_else(|| FfiError::UnknownLibrary {
            name: library.to_string(),
        })?;
        lib.get_func_pointer(function, resolver)
    }

    /// Native pointer held by a struct-pointer handle.
    pub fn get_pointer(
        &self,
        handle: &StructPointerHandle,
        resolver: &dyn SymbolResolver,
    ) -> Result<NativePointer> {
        NativePointerType::get_pointer(handle, resolver)
    }
}
