//! Source-control provenance and the guards that protect cached results.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

use tb_core::errors::{ErrorInfo, TbError};

use crate::layout::{RunHashes, RunIdentity};
use crate::metadata::RunMetadata;

/// Cleanliness of the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorktreeState {
    /// No uncommitted changes.
    Clean,
    /// Uncommitted changes present.
    Dirty,
    /// State could not be determined; the reason is kept for diagnostics.
    Unknown(String),
}

/// Source of revision and toolchain information.
pub trait ProvenanceProvider {
    /// Cleanliness of the worktree.
    fn worktree_state(&self) -> WorktreeState;
    /// Current revision id.
    fn revision(&self) -> Option<String>;
    /// Human friendly revision description.
    fn describe(&self) -> Option<String>;
    /// Unstaged diff when `staged` is false, staged diff otherwise.
    ///
    /// A diff that cannot be captured is an error, never an empty patch.
    fn diff(&self, staged: bool) -> Result<String, TbError>;
    /// Compiler version string.
    fn toolchain(&self) -> Option<String>;
}

/// Provider backed by the `git` and `rustc` executables.
#[derive(Debug, Clone)]
pub struct GitProvenance {
    repo_root: PathBuf,
}

impl GitProvenance {
    /// Queries the repository containing `repo_root`.
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    fn git(&self, args: &[&str]) -> Result<String, String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_root)
            .args(args)
            .output()
            .map_err(|err| err.to_string())?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
        }
    }
}

impl ProvenanceProvider for GitProvenance {
    fn worktree_state(&self) -> WorktreeState {
        match self.git(&["status", "--porcelain"]) {
            Ok(out) if out.trim().is_empty() => WorktreeState::Clean,
            Ok(_) => WorktreeState::Dirty,
            Err(reason) => WorktreeState::Unknown(reason),
        }
    }

    fn revision(&self) -> Option<String> {
        self.git(&["rev-parse", "HEAD"])
            .ok()
            .map(|out| out.trim().to_string())
            .filter(|rev| !rev.is_empty())
    }

    fn describe(&self) -> Option<String> {
        self.git(&["describe", "--always", "--dirty", "--tags"])
            .ok()
            .map(|out| out.trim().to_string())
            .filter(|desc| !desc.is_empty())
    }

    fn diff(&self, staged: bool) -> Result<String, TbError> {
        let args: &[&str] = if staged { &["diff", "--cached"] } else { &["diff"] };
        self.git(args).map_err(|reason| diff_error(staged, reason))
    }

    fn toolchain(&self) -> Option<String> {
        Command::new("rustc")
            .arg("--version")
            .output()
            .ok()
            .filter(|out| out.status.success())
            .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
    }
}

/// Provider returning fixed answers, for tests and offline reruns.
#[derive(Debug, Clone)]
pub struct FixedProvenance {
    /// Reported worktree state.
    pub state: WorktreeState,
    /// Reported revision.
    pub revision: Option<String>,
    /// Reported description.
    pub describe: Option<String>,
    /// Reported unstaged diff.
    pub diff: Option<String>,
    /// Reported staged diff.
    pub diff_cached: Option<String>,
    /// Reported toolchain.
    pub toolchain: Option<String>,
}

impl FixedProvenance {
    /// Clean tree at `revision`.
    pub fn clean(revision: &str) -> Self {
        Self {
            state: WorktreeState::Clean,
            revision: Some(revision.to_string()),
            describe: Some(revision.chars().take(7).collect()),
            diff: None,
            diff_cached: None,
            toolchain: Some("rustc 1.75.0".to_string()),
        }
    }

    /// Dirty tree at `revision` with the given diffs.
    pub fn dirty(revision: &str, diff: &str, diff_cached: &str) -> Self {
        Self {
            state: WorktreeState::Dirty,
            diff: Some(diff.to_string()),
            diff_cached: Some(diff_cached.to_string()),
            ..Self::clean(revision)
        }
    }
}

impl ProvenanceProvider for FixedProvenance {
    fn worktree_state(&self) -> WorktreeState {
        self.state.clone()
    }

    fn revision(&self) -> Option<String> {
        self.revision.clone()
    }

    fn describe(&self) -> Option<String> {
        self.describe.clone()
    }

    fn diff(&self, staged: bool) -> Result<String, TbError> {
        let diff = if staged { &self.diff_cached } else { &self.diff };
        diff.clone().ok_or_else(|| diff_error(staged, "no diff recorded".into()))
    }

    fn toolchain(&self) -> Option<String> {
        self.toolchain.clone()
    }
}

fn diff_error(staged: bool, reason: String) -> TbError {
    TbError::Io(
        ErrorInfo::new("tb_run.git_diff", "worktree diff could not be captured")
            .with_context("staged", staged.to_string())
            .with_context("reason", reason),
    )
}

/// Snapshot of the current provenance, without a run record.
pub fn collect_metadata(provider: &dyn ProvenanceProvider) -> RunMetadata {
    let mut packages = BTreeMap::new();
    packages.insert("tb-core".to_string(), tb_core::VERSION.to_string());
    packages.insert("tb-geom".to_string(), tb_geom::VERSION.to_string());
    packages.insert("tb-phys".to_string(), tb_phys::VERSION.to_string());
    packages.insert("tb-run".to_string(), crate::VERSION.to_string());
    RunMetadata {
        git_commit: provider.revision(),
        git_describe: provider.describe(),
        git_dirty: provider.worktree_state() == WorktreeState::Dirty,
        rustc_version: provider.toolchain(),
        platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
        packages,
        run: None,
    }
}

/// Blocks dirty or unknown worktrees unless `allow_dirty` is set.
pub fn check_worktree(state: &WorktreeState, allow_dirty: bool) -> Result<(), TbError> {
    let (code, message, reason) = match state {
        WorktreeState::Clean => return Ok(()),
        WorktreeState::Dirty => ("tb_run.dirty_worktree", "worktree has uncommitted changes", None),
        WorktreeState::Unknown(reason) => (
            "tb_run.unknown_worktree",
            "worktree state could not be determined",
            Some(reason.as_str()),
        ),
    };
    if allow_dirty {
        tracing::warn!(reason = reason.unwrap_or(message), "running on an unclean worktree");
        return Ok(());
    }
    let mut info = ErrorInfo::new(code, message).with_hint("pass --allow_dirty to run anyway");
    if let Some(reason) = reason {
        info = info.with_context("reason", reason);
    }
    Err(TbError::Provenance(info))
}

/// Blocks when existing results were produced by a different revision.
///
/// Only fires when both revisions are known. `force` turns the block into a
/// warning.
pub fn check_stale(
    existing: Option<&RunMetadata>,
    current: &RunMetadata,
    force: bool,
) -> Result<(), TbError> {
    let stored = existing.and_then(|meta| meta.git_commit.as_deref());
    let (Some(stored), Some(current)) = (stored, current.git_commit.as_deref()) else {
        return Ok(());
    };
    if stored == current {
        return Ok(());
    }
    if force {
        tracing::warn!(stored, current, "overwriting results from another revision");
        return Ok(());
    }
    Err(TbError::Provenance(
        ErrorInfo::new(
            "tb_run.stale_results",
            format!("existing results are from {stored}; you're on {current}"),
        )
        .with_context("stored", stored)
        .with_context("current", current)
        .with_hint("pass --force_rerun to overwrite"),
    ))
}

/// Blocks when the bucket's recorded digests differ from this run's.
///
/// Equal truncated hashes with different digests mean two configurations
/// landed in one directory. No flag overrides this.
pub fn check_collision(existing: Option<&RunMetadata>, identity: &RunIdentity) -> Result<(), TbError> {
    let Some(stored) = existing.and_then(|meta| meta.run.as_ref()) else {
        return Ok(());
    };
    if let Some(section) = mismatched_section(&stored.digests, &identity.digests) {
        return Err(TbError::Provenance(
            ErrorInfo::new(
                "tb_run.hash_collision",
                "run directory holds results of a different configuration",
            )
            .with_context("section", section)
            .with_context("path", identity.relative.display().to_string())
            .with_hint("pass a longer --hash-length"),
        ));
    }
    Ok(())
}

fn mismatched_section(stored: &RunHashes, current: &RunHashes) -> Option<&'static str> {
    if stored.geo != current.geo {
        return Some("geometry");
    }
    if stored.phys != current.phys {
        return Some("physics");
    }
    match (&stored.solver, &current.solver) {
        (Some(left), Some(right)) if left != right => Some("solver"),
        _ => None,
    }
}
