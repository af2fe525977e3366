#![deny(missing_docs)]
#![doc = "Core types, structured errors and canonical hashing shared by the tight-binding crates."]

use std::fmt;

use ::serde::{Deserialize, Serialize};

pub mod errors;
pub mod hash;
pub mod rng;
pub mod serde;

pub use crate::serde::{to_canonical_json_bytes, to_canonical_json_string};
pub use errors::{ErrorInfo, TbError};
pub use hash::{
    check_hash_length, full_digest, stable_hash, ContentHash, DEFAULT_HASH_LENGTH,
    MAX_HASH_LENGTH, MIN_HASH_LENGTH,
};
pub use rng::{derive_substream_seed, RngHandle};

/// Crate version recorded in run metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Position of a site in the full, pre-removal lattice enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GlobalIndex(usize);

impl GlobalIndex {
    /// Creates a new index from its raw representation.
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw representation.
    pub fn as_raw(&self) -> usize {
        self.0
    }
}

/// Position of a surviving site in the compacted ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActiveIndex(usize);

impl ActiveIndex {
    /// Creates a new index from its raw representation.
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw representation.
    pub fn as_raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for GlobalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

impl fmt::Display for ActiveIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Directed coupling between two active sites.
pub type Bond = (ActiveIndex, ActiveIndex);
