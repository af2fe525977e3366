#![deny(missing_docs)]
#![doc = "Content-addressed result layout, provenance guard, skip checks and run orchestration."]
//!
//! Concurrent runs writing the same bucket are not coordinated; directory
//! creation is idempotent but the last writer's metadata wins.

pub mod config;
pub mod layout;
pub mod metadata;
pub mod provenance;
pub mod simulation;
pub mod skip;

pub use config::{load_raw, LoadedConfig};
pub use layout::{RunHashes, RunIdentity, RunLayout};
pub use metadata::{RunArgs, RunMetadata, RunRecord, METADATA_FILE};
pub use provenance::{
    check_collision, check_stale, check_worktree, collect_metadata, FixedProvenance,
    GitProvenance, ProvenanceProvider, WorktreeState,
};
pub use simulation::{
    run_simulation, RunOptions, RunOutcome, Simulation, CONFIG_COPY, DIFF_CACHED_FILE, DIFF_FILE,
    SPECTRUM_ARTIFACT,
};
pub use skip::{artifact_path, should_skip};

/// Crate version recorded in run metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
