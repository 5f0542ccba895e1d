//! Core error types.

use crate::registry::TypeId;

/// Errors raised by the type registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The id was not issued by this registry.
    #[error("unknown type id {0}")]
    UnknownType(TypeId),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
