use std::collections::BTreeSet;

use serde::Serialize;
use tb_core::errors::TbError;
use tb_core::{to_canonical_json_bytes, ContentHash};

use crate::config::GeometryConfig;
use crate::lattice::Lattice;

#[derive(Serialize)]
struct GeometryState<'a> {
    config: &'a GeometryConfig,
    removed_sites: &'a BTreeSet<Vec<usize>>,
}

impl ContentHash for Lattice {
    /// Base configuration plus the sorted defect list, so equal defect sets
    /// hash identically regardless of removal order.
    fn hash_payload(&self) -> Result<Vec<u8>, TbError> {
        to_canonical_json_bytes(&GeometryState {
            config: self.config(),
            removed_sites: self.removed_sites(),
        })
    }
}

impl ContentHash for GeometryConfig {
    fn hash_payload(&self) -> Result<Vec<u8>, TbError> {
        to_canonical_json_bytes(self)
    }
}

/// Truncated geometry hash of `lattice`.
pub fn geometry_hash(lattice: &Lattice, length: usize) -> Result<String, TbError> {
    lattice.content_hash(length)
}
