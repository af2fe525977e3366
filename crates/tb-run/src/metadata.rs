//! Run metadata records.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tb_core::errors::{ErrorInfo, TbError};

use crate::layout::RunHashes;

/// File name of the metadata record inside a run directory.
pub const METADATA_FILE: &str = "metadata.yaml";

fn io_error(code: &str, path: &Path, err: impl ToString) -> TbError {
    TbError::Io(ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()))
}

fn serde_error(code: &str, path: &Path, err: impl ToString) -> TbError {
    TbError::Serde(ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()))
}

/// Invocation options echoed into the run record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunArgs {
    /// Configuration path as given.
    pub config: String,
    /// Dirty worktree override.
    pub allow_dirty: bool,
    /// Stale revision and existing artifact override.
    pub force_rerun: bool,
    /// Hash truncation length.
    pub hash_length: usize,
}

/// What happened during the last run that wrote artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// RFC 3339 UTC start time.
    pub started_at: String,
    /// Wall time from start to metadata write.
    pub duration_sec: f64,
    /// Invocation options.
    pub args: RunArgs,
    /// Absolute run directory.
    pub run_dir: String,
    /// Truncated hashes naming the directory.
    pub hashes: RunHashes,
    /// Full digests behind the hashes.
    pub digests: RunHashes,
    /// Artifacts written by this run.
    #[serde(default)]
    pub artifacts: Vec<String>,
}

/// Provenance snapshot stored as `metadata.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Source revision, absent when unknown.
    #[serde(default)]
    pub git_commit: Option<String>,
    /// `git describe` output, absent when unknown.
    #[serde(default)]
    pub git_describe: Option<String>,
    /// Whether the worktree had uncommitted changes.
    #[serde(default)]
    pub git_dirty: bool,
    /// Toolchain version string.
    #[serde(default)]
    pub rustc_version: Option<String>,
    /// `os-arch` of the host.
    #[serde(default)]
    pub platform: String,
    /// Versions of the crates that produced the run.
    #[serde(default)]
    pub packages: BTreeMap<String, String>,
    /// Latest run record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<RunRecord>,
}

impl RunMetadata {
    /// Reads `path`; `None` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, TbError> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path).map_err(|err| io_error("tb_run.metadata_read", path, err))?;
        let metadata =
            serde_yaml::from_str(&text).map_err(|err| serde_error("tb_run.metadata_parse", path, err))?;
        Ok(Some(metadata))
    }

    /// Writes the record as YAML, replacing any previous file.
    pub fn save(&self, path: &Path) -> Result<(), TbError> {
        let text =
            serde_yaml::to_string(self).map_err(|err| serde_error("tb_run.metadata_encode", path, err))?;
        fs::write(path, text).map_err(|err| io_error("tb_run.metadata_write", path, err))?;
        tracing::info!(path = %path.display(), "wrote metadata");
        Ok(())
    }
}
