//! Hash-derived result directories.
//!
//! A run lives at `results_dir/geo_<g>/phys_<p>[/solv_<s>]`. The segments are
//! truncated content hashes, so two configurations share a directory exactly
//! when their geometry (including defects), physics and solver agree. Path
//! construction is pure; only [`RunLayout::create`] touches the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tb_core::errors::{ErrorInfo, TbError};
use tb_core::{check_hash_length, ContentHash};
use tb_geom::Lattice;
use tb_phys::{SolverConfig, TbPhysics};

/// Per-section hashes of a run, or their full digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHashes {
    /// Geometry plus sorted defects.
    pub geo: String,
    /// Physics configuration.
    pub phys: String,
    /// Solver configuration, absent for solver-less runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<String>,
}

/// Truncated hashes, full digests and the relative bucket path of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIdentity {
    /// Hashes truncated to the requested length.
    pub hashes: RunHashes,
    /// Full 64 character digests, kept for collision detection.
    pub digests: RunHashes,
    /// Bucket path relative to the results root.
    pub relative: PathBuf,
}

/// Root directories of the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    /// Directory configuration names are resolved against.
    pub configs_dir: PathBuf,
    /// Root of the content-addressed results tree.
    pub results_dir: PathBuf,
}

impl RunLayout {
    /// Creates a layout from explicit directories.
    pub fn new(configs_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            configs_dir: configs_dir.into(),
            results_dir: results_dir.into(),
        }
    }

    /// `root/configs` and `root/results`.
    pub fn from_project_root(root: &Path) -> Self {
        Self::new(root.join("configs"), root.join("results"))
    }

    /// Resolves a configuration name; absolute paths pass through.
    pub fn config_path(&self, name: &Path) -> PathBuf {
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.configs_dir.join(name)
        }
    }

    /// Computes the identity of a run without touching the filesystem.
    pub fn resolve(
        &self,
        lattice: &Lattice,
        physics: &TbPhysics,
        solver: Option<&SolverConfig>,
        hash_length: usize,
    ) -> Result<RunIdentity, TbError> {
        check_hash_length(hash_length)?;
        let digests = RunHashes {
            geo: lattice.content_digest()?,
            phys: physics.content_digest()?,
            solver: solver.map(ContentHash::content_digest).transpose()?,
        };
        let truncate = |digest: &str| digest[..hash_length].to_string();
        let hashes = RunHashes {
            geo: truncate(&digests.geo),
            phys: truncate(&digests.phys),
            solver: digests.solver.as_deref().map(truncate),
        };
        let mut relative = PathBuf::from(format!("geo_{}", hashes.geo));
        relative.push(format!("phys_{}", hashes.phys));
        if let Some(solver) = &hashes.solver {
            relative.push(format!("solv_{solver}"));
        }
        tracing::debug!(
            geo = %hashes.geo,
            phys = %hashes.phys,
            solver = hashes.solver.as_deref().unwrap_or("-"),
            "run identity resolved"
        );
        Ok(RunIdentity {
            hashes,
            digests,
            relative,
        })
    }

    /// Absolute bucket path of `identity`.
    pub fn run_dir(&self, identity: &RunIdentity) -> PathBuf {
        self.results_dir.join(&identity.relative)
    }

    /// Creates the bucket directory; succeeds when it already exists.
    pub fn create(&self, identity: &RunIdentity) -> Result<PathBuf, TbError> {
        let dir = self.run_dir(identity);
        fs::create_dir_all(&dir).map_err(|err| {
            TbError::Io(
                ErrorInfo::new("tb_run.create_dir", err.to_string())
                    .with_context("path", dir.display().to_string()),
            )
        })?;
        Ok(dir)
    }
}
