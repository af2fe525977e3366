//! Simulation orchestration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tb_core::errors::{ErrorInfo, TbError};
use tb_core::DEFAULT_HASH_LENGTH;
use tb_geom::Lattice;
use tb_phys::{build_hamiltonian, density_of_states, SimulationConfig, Spectrum};

use crate::config::{load_raw, LoadedConfig};
use crate::layout::{RunIdentity, RunLayout};
use crate::metadata::{RunArgs, RunMetadata, RunRecord, METADATA_FILE};
use crate::provenance::{
    check_collision, check_stale, check_worktree, collect_metadata, ProvenanceProvider,
};
use crate::skip::{artifact_path, should_skip};

/// Artifact holding the density of states.
pub const SPECTRUM_ARTIFACT: &str = "spectrum";
/// Verbatim copy of the configuration file.
pub const CONFIG_COPY: &str = "config.yaml";
/// Unstaged diff written for dirty runs.
pub const DIFF_FILE: &str = "git_diff.patch";
/// Staged diff written for dirty runs.
pub const DIFF_CACHED_FILE: &str = "git_diff_cached.patch";

fn io_error(code: &str, path: &Path, err: impl ToString) -> TbError {
    TbError::Io(ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()))
}

/// Invocation options of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Configuration name, resolved against the configs directory.
    pub config: PathBuf,
    /// Run on a dirty or unknown worktree.
    pub allow_dirty: bool,
    /// Overwrite stale results and recompute existing artifacts.
    pub force_rerun: bool,
    /// Hash truncation length.
    pub hash_length: usize,
}

impl RunOptions {
    /// Options with both overrides off and the default hash length.
    pub fn new(config: impl Into<PathBuf>) -> Self {
        Self {
            config: config.into(),
            allow_dirty: false,
            force_rerun: false,
            hash_length: DEFAULT_HASH_LENGTH,
        }
    }

    fn args(&self) -> RunArgs {
        RunArgs {
            config: self.config.display().to_string(),
            allow_dirty: self.allow_dirty,
            force_rerun: self.force_rerun,
            hash_length: self.hash_length,
        }
    }
}

/// Result of a run that passed every guard.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Artifacts were computed and metadata rewritten.
    Completed {
        /// Bucket directory.
        run_dir: PathBuf,
        /// Hashes naming the bucket.
        identity: RunIdentity,
        /// Artifacts written.
        artifacts: Vec<String>,
    },
    /// Every artifact already existed; nothing was written.
    Skipped {
        /// Bucket directory.
        run_dir: PathBuf,
        /// Hashes naming the bucket.
        identity: RunIdentity,
    },
}

impl RunOutcome {
    /// Bucket directory of the run.
    pub fn run_dir(&self) -> &Path {
        match self {
            RunOutcome::Completed { run_dir, .. } | RunOutcome::Skipped { run_dir, .. } => run_dir,
        }
    }

    /// Identity of the run.
    pub fn identity(&self) -> &RunIdentity {
        match self {
            RunOutcome::Completed { identity, .. } | RunOutcome::Skipped { identity, .. } => identity,
        }
    }

    /// True when nothing was written.
    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::Skipped { .. })
    }
}

/// A validated run whose guards have passed but which has not written yet.
#[derive(Debug)]
pub struct Simulation {
    options: RunOptions,
    layout: RunLayout,
    loaded: LoadedConfig,
    config: SimulationConfig,
    lattice: Lattice,
    identity: RunIdentity,
    run_dir: PathBuf,
    metadata: RunMetadata,
    started_at: DateTime<Utc>,
    t0: Instant,
}

impl Simulation {
    /// Loads and validates the configuration, then runs every guard.
    ///
    /// Order: schema and cross-checks, worktree, identity, collision, stale
    /// revision. Nothing is created on disk; a failure at any step leaves
    /// the results tree as it was.
    pub fn prepare(
        layout: &RunLayout,
        options: RunOptions,
        provider: &dyn ProvenanceProvider,
    ) -> Result<Self, TbError> {
        let started_at = Utc::now();
        let t0 = Instant::now();

        let path = layout.config_path(&options.config);
        let loaded = load_raw(&path)?;
        let config = loaded.parse()?;
        config.validate()?;

        check_worktree(&provider.worktree_state(), options.allow_dirty)?;

        let lattice = config.build_geometry()?;
        let identity = layout.resolve(
            &lattice,
            &config.physics,
            Some(&config.solver),
            options.hash_length,
        )?;
        let run_dir = layout.run_dir(&identity);

        let existing = RunMetadata::load(&run_dir.join(METADATA_FILE))?;
        let metadata = collect_metadata(provider);
        check_collision(existing.as_ref(), &identity)?;
        check_stale(existing.as_ref(), &metadata, options.force_rerun)?;

        Ok(Self {
            options,
            layout: layout.clone(),
            loaded,
            config,
            lattice,
            identity,
            run_dir,
            metadata,
            started_at,
            t0,
        })
    }

    /// Hashes and bucket path of the run.
    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    /// Absolute bucket directory.
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Parsed configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Computes missing artifacts and records the run.
    ///
    /// The spectrum and any worktree diffs are produced before the bucket is
    /// created, so a failure there writes nothing.
    pub fn execute(mut self, provider: &dyn ProvenanceProvider) -> Result<RunOutcome, TbError> {
        if should_skip(&self.run_dir, SPECTRUM_ARTIFACT, self.options.force_rerun) {
            return Ok(RunOutcome::Skipped {
                run_dir: self.run_dir,
                identity: self.identity,
            });
        }

        let hamiltonian = build_hamiltonian(&self.config, &self.lattice)?;
        let spectrum = density_of_states(&hamiltonian, &self.config.solver)?;
        if let Some(equilibrium) = &self.config.solver.equilibrium {
            tracing::info!(
                filling = spectrum.filling(equilibrium),
                mu = equilibrium.mu,
                temperature = equilibrium.temperature,
                "equilibrium filling"
            );
        }
        let diffs = if self.metadata.git_dirty {
            Some((provider.diff(false)?, provider.diff(true)?))
        } else {
            None
        };

        self.layout.create(&self.identity)?;
        self.save_config()?;
        self.save_spectrum(&spectrum)?;
        let artifacts = vec![SPECTRUM_ARTIFACT.to_string()];

        self.save_metadata(&artifacts)?;
        if let Some((diff, diff_cached)) = diffs {
            self.save_diffs(&diff, &diff_cached)?;
        }

        Ok(RunOutcome::Completed {
            run_dir: self.run_dir,
            identity: self.identity,
            artifacts,
        })
    }

    fn save_config(&self) -> Result<(), TbError> {
        let path = self.run_dir.join(CONFIG_COPY);
        fs::write(&path, &self.loaded.text).map_err(|err| io_error("tb_run.config_copy", &path, err))?;
        tracing::info!(path = %path.display(), "wrote config copy");
        Ok(())
    }

    fn save_spectrum(&self, spectrum: &Spectrum) -> Result<(), TbError> {
        #[derive(Serialize)]
        struct Row {
            omega: f64,
            dos: f64,
        }

        let path = artifact_path(&self.run_dir, SPECTRUM_ARTIFACT);
        let csv_error = |err: csv::Error| io_error("tb_run.artifact_write", &path, err);
        let mut writer = csv::Writer::from_path(&path).map_err(csv_error)?;
        for (&omega, &dos) in spectrum.omega.iter().zip(&spectrum.dos) {
            writer.serialize(Row { omega, dos }).map_err(csv_error)?;
        }
        writer
            .flush()
            .map_err(|err| io_error("tb_run.artifact_write", &path, err))?;
        tracing::info!(artifact = SPECTRUM_ARTIFACT, path = %path.display(), "wrote artifact");
        Ok(())
    }

    fn save_metadata(&mut self, artifacts: &[String]) -> Result<(), TbError> {
        self.metadata.run = Some(RunRecord {
            started_at: self.started_at.to_rfc3339(),
            duration_sec: self.t0.elapsed().as_secs_f64(),
            args: self.options.args(),
            run_dir: self.run_dir.display().to_string(),
            hashes: self.identity.hashes.clone(),
            digests: self.identity.digests.clone(),
            artifacts: artifacts.to_vec(),
        });
        self.metadata.save(&self.run_dir.join(METADATA_FILE))
    }

    fn save_diffs(&self, diff: &str, diff_cached: &str) -> Result<(), TbError> {
        for (diff, name) in [(diff, DIFF_FILE), (diff_cached, DIFF_CACHED_FILE)] {
            let path = self.run_dir.join(name);
            fs::write(&path, diff).map_err(|err| io_error("tb_run.diff_write", &path, err))?;
        }
        tracing::info!(run_dir = %self.run_dir.display(), "wrote worktree diffs");
        Ok(())
    }
}

/// Prepares and executes a run in one call.
pub fn run_simulation(
    layout: &RunLayout,
    options: RunOptions,
    provider: &dyn ProvenanceProvider,
) -> Result<RunOutcome, TbError> {
    Simulation::prepare(layout, options, provider)?.execute(provider)
}
