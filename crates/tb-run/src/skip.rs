//! Artifact skip checks.

use std::path::{Path, PathBuf};

/// Path of the CSV artifact `name` inside `run_dir`.
pub fn artifact_path(run_dir: &Path, name: &str) -> PathBuf {
    run_dir.join(format!("{name}.csv"))
}

/// True when the artifact already exists and `force` is not set.
///
/// Only observes the filesystem; the caller decides what skipping means.
pub fn should_skip(run_dir: &Path, name: &str, force: bool) -> bool {
    let path = artifact_path(run_dir, name);
    let skip = !force && path.exists();
    if skip {
        tracing::info!(artifact = name, path = %path.display(), "skipping existing artifact");
    }
    skip
}
