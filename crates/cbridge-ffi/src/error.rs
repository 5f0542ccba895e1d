//! FFI error types.

/// Errors that can occur while registering or resolving native bindings.
#[derive(Debug, thiserror::Error)]
pub enum FfiError {
    /// The library's textual identity did not match `<Lib object for 'NAME'>`.
    #[error("cannot extract library name from {repr:?}")]
    LibraryNameFormat { repr: String },

    /// The library does not export the requested function.
    #[error("Function {name} is not present in the library {library}")]
    FunctionNotFound { name: String, library: String },

    /// No library with this name has been registered.
    #[error("unknown library '{name}'")]
    UnknownLibrary { name: String },

    /// A struct was referenced before being registered.
    #[error("unknown struct '{cname}'")]
    UnknownStruct { cname: String },

    /// A session attribute that carries no capability.
    #[error("FFI session has no attribute '{attr}'")]
    UnsupportedSessionAttribute { attr: String },

    /// `from_buffer` was given something that is not a buffer.
    #[error("from_buffer() expects a buffer, got {ty}")]
    UnsupportedBufferArgument { ty: String },

    /// `from_buffer` was given a buffer without contiguous layout.
    #[error("from_buffer() requires a contiguous buffer, got {ty}")]
    NonContiguousBuffer { ty: String },

    /// A declared type name outside the supported vocabulary.
    #[error("invalid type name '{name}': {detail}")]
    InvalidTypeName { name: String, detail: String },

    /// The external symbol resolver failed.
    #[error("symbol resolution failed: {detail}")]
    Resolver { detail: String },

    /// Failed to parse a bridge declaration file.
    #[error("invalid bridge declaration: {detail}")]
    InvalidDeclaration { detail: String },

    /// Type registry error.
    #[error("registry error: {0}")]
    Registry(#[from] cbridge_core::RegistryError),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for FFI operations.
pub type Result<T> = std::result::Result<T, FfiError>;
