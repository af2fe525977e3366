use tb_core::errors::TbError;
use tb_core::{to_canonical_json_bytes, ContentHash};

use crate::physics::TbPhysics;
use crate::solver::SolverConfig;

impl ContentHash for TbPhysics {
    /// The configuration as written; the `nn1` expansion is not applied.
    fn hash_payload(&self) -> Result<Vec<u8>, TbError> {
        to_canonical_json_bytes(self)
    }
}

impl ContentHash for SolverConfig {
    fn hash_payload(&self) -> Result<Vec<u8>, TbError> {
        to_canonical_json_bytes(self)
    }
}
