//! Interning registry for types.
//!
//! Owns the canonical instance of every registered type. Interning uses
//! each type's identity key, so constructing the same type twice yields
//! the same [`TypeId`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::types::Type;

/// Handle to an interned type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Interner for [`Type`] values.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: Vec<Type>,
    index: HashMap<Type, TypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `ty`, returning the id of the canonical instance.
    ///
    /// The first instance registered under a key stays canonical; later
    /// type-equal values (for example a struct reference built from a
    /// different origin) are dropped.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(id) = self.index.get(&ty) {
            return *id;
        }
        let id = TypeId(self.types.len() as u32);
        tracing::trace!(%id, ty = %ty, "interned type");
        self.types.push(ty.clone());
        self.index.insert(ty, id);
        id
    }

    /// Id of an already interned type-equal value.
    pub fn lookup(&self, ty: &Type) -> Option<TypeId> {
        self.index.get(ty).copied()
    }

    pub fn get(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id.index())
    }

    /// Like [`get`](Self::get), but an unknown id is an error.
    pub fn resolve(&self, id: TypeId) -> Result<&Type> {
        self.get(id).ok_or(RegistryError::UnknownType(id))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All interned types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &Type)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, ty)| (TypeId(i as u32), ty))
    }
}
