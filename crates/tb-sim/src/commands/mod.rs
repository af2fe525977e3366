pub mod hash;
pub mod run;
pub mod version;

use std::path::PathBuf;

use clap::Args;
use tb_core::DEFAULT_HASH_LENGTH;
use tb_run::RunLayout;

/// Arguments locating a configuration and the results tree.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Configuration file, relative to `--configs-dir` unless absolute.
    #[arg(long)]
    pub config: PathBuf,
    /// Directory configuration names are resolved against.
    #[arg(long = "configs-dir", default_value = "configs")]
    pub configs_dir: PathBuf,
    /// Root of the content-addressed results tree.
    #[arg(long = "results-dir", default_value = "results")]
    pub results_dir: PathBuf,
    /// Hex characters kept from each digest (6..=32).
    #[arg(long = "hash-length", default_value_t = DEFAULT_HASH_LENGTH)]
    pub hash_length: usize,
}

impl ProjectArgs {
    pub fn layout(&self) -> RunLayout {
        RunLayout::new(&self.configs_dir, &self.results_dir)
    }
}
