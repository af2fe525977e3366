//! Truncated SHA-256 fingerprints over canonical JSON.
//!
//! Truncation trades collision resistance for short directory names. At the
//! default 12 hex characters (48 bits) accidental collisions are negligible
//! for any realistic number of runs, but they are not impossible; callers that
//! persist a hash should also persist [`full_digest`] so a collision can be
//! detected instead of silently sharing a result bucket.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::{ErrorInfo, TbError};
use crate::serde::to_canonical_json_bytes;

/// Default number of hex characters kept from the digest.
pub const DEFAULT_HASH_LENGTH: usize = 12;
/// Shortest accepted truncation.
pub const MIN_HASH_LENGTH: usize = 6;
/// Longest accepted truncation.
pub const MAX_HASH_LENGTH: usize = 32;

/// Fails unless `length` lies in `[MIN_HASH_LENGTH, MAX_HASH_LENGTH]`.
pub fn check_hash_length(length: usize) -> Result<(), TbError> {
    if !(MIN_HASH_LENGTH..=MAX_HASH_LENGTH).contains(&length) {
        return Err(TbError::Validation(
            ErrorInfo::new("tb_core.hash_length", "hash length out of range")
                .with_context("length", length.to_string())
                .with_context(
                    "expected",
                    format!("{MIN_HASH_LENGTH}..={MAX_HASH_LENGTH}"),
                ),
        ));
    }
    Ok(())
}

/// Hex SHA-256 digest of raw bytes.
pub fn digest_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Full 64 character digest of the canonical form of `value`.
pub fn full_digest<T: Serialize>(value: &T) -> Result<String, TbError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(digest_hex(&bytes))
}

/// First `length` hex characters of the canonical digest of `value`.
pub fn stable_hash<T: Serialize>(value: &T, length: usize) -> Result<String, TbError> {
    check_hash_length(length)?;
    let mut digest = full_digest(value)?;
    digest.truncate(length);
    Ok(digest)
}

/// Types whose identity is the digest of a canonical byte payload.
pub trait ContentHash {
    /// Canonical bytes the identity is computed from.
    fn hash_payload(&self) -> Result<Vec<u8>, TbError>;

    /// Truncated identity, `length` hex characters.
    fn content_hash(&self, length: usize) -> Result<String, TbError> {
        check_hash_length(length)?;
        let mut digest = self.content_digest()?;
        digest.truncate(length);
        Ok(digest)
    }

    /// Full identity digest.
    fn content_digest(&self) -> Result<String, TbError> {
        Ok(digest_hex(&self.hash_payload()?))
    }
}
