//! Type universe and conversion lattice for the cbridge native type bridge.
//!
//! ## Modules
//!
//! - [`types`] — Host base vocabulary and the native bridge variants
//! - [`conversion`] — Conversion verdicts, the host context trait, bridge rules
//! - [`registry`] — Interning of types by identity key
//! - [`hash`] — Deterministic type fingerprints
//! - [`error`] — Registry errors

pub mod conversion;
pub mod error;
pub mod hash;
pub mod registry;
pub mod types;

pub use conversion::{BaseConversions, Conversion, ConversionContext};
pub use error::RegistryError;
pub use registry::{TypeId, TypeRegistry};
pub use types::{
    CallSignatures, FfiSessionType, NativeLibraryType, NativePointerType, Ownership, PointerKind,
    SessionId, Signature, StructDescriptor, StructField, StructValueType, Type,
};
