use std::path::PathBuf;

use clap::Args;
use tb_core::TbError;
use tb_run::{run_simulation, GitProvenance, RunOptions, RunOutcome};

use super::ProjectArgs;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
    /// Run even when the worktree has uncommitted changes.
    #[arg(long = "allow_dirty")]
    pub allow_dirty: bool,
    /// Overwrite results from another revision and recompute existing artifacts.
    #[arg(long = "force_rerun")]
    pub force_rerun: bool,
    /// Repository queried for provenance.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
}

pub fn run(args: &RunArgs) -> Result<(), TbError> {
    let provider = GitProvenance::new(&args.repo);
    let options = RunOptions {
        config: args.project.config.clone(),
        allow_dirty: args.allow_dirty,
        force_rerun: args.force_rerun,
        hash_length: args.project.hash_length,
    };
    match run_simulation(&args.project.layout(), options, &provider)? {
        RunOutcome::Completed {
            run_dir, artifacts, ..
        } => {
            tracing::info!(run_dir = %run_dir.display(), artifacts = artifacts.len(), "run complete");
            println!("{}", run_dir.display());
        }
        RunOutcome::Skipped { run_dir, .. } => {
            tracing::info!(run_dir = %run_dir.display(), "nothing to do");
            eprintln!(
                "skipped: artifacts already exist in {}; pass --force_rerun to recompute",
                run_dir.display()
            );
            println!("{}", run_dir.display());
        }
    }
    Ok(())
}
