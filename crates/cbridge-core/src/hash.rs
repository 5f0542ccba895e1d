//! Content-addressed fingerprints for types.
//!
//! The fingerprint covers a type's serialized identity. Struct-reference
//! back-references are not serialized, so two types that compare equal
//! always share a fingerprint and can key the same compiled artifacts.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::types::Type;

/// A 32-byte SHA-256 content hash.
pub type ContentHash = [u8; 32];

/// Compute the SHA-256 content hash of any serializable value.
pub fn content_hash<T: Serialize>(value: &T) -> ContentHash {
    let json = serde_json::to_vec(value).expect("serialization should not fail");
    let mut hasher = Sha256::new();
    hasher.update(&json);
    hasher.finalize().into()
}

/// Format a content hash as a hex string.
pub fn hash_hex(hash: &ContentHash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

impl Type {
    /// Deterministic fingerprint of this type's identity.
    pub fn fingerprint(&self) -> ContentHash {
        content_hash(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NativePointerType, Ownership, StructDescriptor, StructValueType};

    fn node() -> Type {
        Type::StructValue(StructValueType::new(
            StructDescriptor::new("struct Node").with_field("value", Type::i32()),
        ))
    }

    #[test]
    fn deterministic_hash() {
        let h1 = content_hash(&"hello world");
        let h2 = content_hash(&"hello world");
        assert_eq!(h1, h2);
    }

    #[test]
    fn hash_hex_format() {
        let hex = hash_hex(&Type::i32().fingerprint());
        assert_eq!(hex.len(), 64);
    }

    #[test]
    fn ownership_changes_fingerprint() {
        let borrowed = Type::native_ptr(Type::i32());
        let owning = Type::owning_ptr(Type::i32());
        assert_eq!(borrowed.fingerprint(), Type::native_ptr(Type::i32()).fingerprint());
        assert_ne!(borrowed.fingerprint(), owning.fingerprint());
    }

    #[test]
    fn struct_ref_origin_not_fingerprinted() {
        let a = NativePointerType::struct_ref(NativePointerType::borrowed(node()));
        let b = NativePointerType::struct_ref(NativePointerType::struct_ref(
            NativePointerType::new(node(), Ownership::Borrowed),
        ));
        assert_eq!(a, b);
        assert_eq!(
            Type::NativePointer(a).fingerprint(),
            Type::NativePointer(b).fingerprint()
        );
    }

    #[test]
    fn struct_ref_and_raw_fingerprints_differ() {
        let raw = NativePointerType::borrowed(node());
        let reference = NativePointerType::struct_ref(raw.clone());
        assert_ne!(
            Type::NativePointer(raw).fingerprint(),
            Type::NativePointer(reference).fingerprint()
        );
    }
}
