//! Native library binding layer for the cbridge type bridge.
//!
//! Turns loaded native libraries, FFI sessions, and struct descriptors into
//! interned [`cbridge_core::Type`]s, and delegates pointer resolution to an
//! external [`SymbolResolver`].
//!
//! ## Modules
//!
//! - [`binding`] — Library and symbol-resolver capabilities
//! - [`library`] — Library handle construction and function lookup
//! - [`pointer`] — Struct-pointer access
//! - [`session`] — Session identity and `from_buffer`
//! - [`structs`] — Struct descriptors and type mappings
//! - [`typename`] — Declared type-name resolution
//! - [`declaration`] — `.bridge.toml` declaration files
//! - [`config`] — Bridge configuration
//! - [`bridge`] — Registration front door

pub mod binding;
pub mod bridge;
pub mod config;
pub mod declaration;
pub mod error;
pub mod library;
pub mod pointer;
pub mod session;
pub mod structs;
pub mod typename;

// Re-export key types for convenience
pub use binding::{
    AttributeKind, LibraryAttribute, LibraryBinding, NativePointer, StructPointerHandle,
    SymbolResolver, SymbolTable,
};
pub use bridge::{Bridge, ModuleBinding, RegisteredModule};
pub use config::BridgeConfig;
pub use declaration::FfiDeclaration;
pub use error::FfiError;
pub use library::{library_type, library_type_with, parse_library_repr, LibraryHandle};
pub use pointer::StructPointerAccess;
pub use session::{SessionAttribute, SessionCapabilities, SessionRegistry, SessionToken};
pub use structs::StructTypeMap;
pub use typename::TypeNameResolver;
