//! Canonical serialization for layout fingerprints.
//!
//! Layout output and grid policies are hashed over their JSON encoding.
//! Struct fields serialize in declaration order and vectors in index order,
//! so equal values always produce equal bytes. Hashed types must not contain
//! `HashMap`s.

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Serialize a value to canonical JSON bytes.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("layout types always serialize to JSON")
}

/// xxHash64 of the canonical bytes.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    xxh64(&to_canonical_bytes(value), 0)
}

/// Canonical hash as 16 lowercase hex digits.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}
