//! SHA-256 hashing over canonical JSON bytes. Used to fingerprint a loaded
//! `RuleCatalog` for logging/diagnostics (so a host can tell which catalog
//! version a given `ValidationResult` was produced against without
//! re-reading the source file).
//!
//! Deterministic: same canonical structure => same lowercase 64-hex across
//! OS/arch.

#![forbid(unsafe_code)]

use crate::CatalogError;

#[cfg(feature = "hash")]
use digest::Digest;
#[cfg(feature = "hash")]
use sha2::Sha256;

#[cfg(all(feature = "hash", feature = "serde"))]
use crate::canonical_json::to_canonical_json_bytes;

/// Compute lowercase 64-hex SHA-256 of raw bytes.
#[cfg(feature = "hash")]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(not(feature = "hash"))]
pub fn sha256_hex(_bytes: &[u8]) -> String {
    String::new()
}

/// SHA-256 of the catalog document's canonical JSON bytes (sorted keys).
#[cfg(all(feature = "hash", feature = "serde"))]
pub fn sha256_canonical_value(value: &serde_json::Value) -> Result<String, CatalogError> {
    Ok(sha256_hex(&to_canonical_json_bytes(value)))
}

#[cfg(not(all(feature = "hash", feature = "serde")))]
pub fn sha256_canonical_value(_value: &serde_json::Value) -> Result<String, CatalogError> {
    Err(CatalogError::Hash("hash+serde features required".into()))
}

/// True iff string is lowercase 64-hex.
pub fn is_hex64(s: &str) -> bool {
    s.len() == 64 && s.as_bytes().iter().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
