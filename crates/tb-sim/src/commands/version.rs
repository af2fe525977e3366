use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;
use tb_core::{to_canonical_json_string, TbError};
use tb_run::{GitProvenance, ProvenanceProvider};

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Emit extended metadata including git and toolchain information.
    #[arg(long)]
    pub long: bool,
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: String,
    git_commit: String,
    rustc: String,
    crates: BTreeMap<String, String>,
}

pub fn run(args: &VersionArgs) -> Result<(), TbError> {
    if !args.long {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    println!("{}", to_canonical_json_string(&gather_info())?);
    Ok(())
}

fn gather_info() -> VersionInfo {
    let provider = GitProvenance::new(".");
    let crates = [
        ("tb-core", tb_core::VERSION),
        ("tb-geom", tb_geom::VERSION),
        ("tb-phys", tb_phys::VERSION),
        ("tb-run", tb_run::VERSION),
    ]
    .into_iter()
    .map(|(name, version)| (name.to_string(), version.to_string()))
    .collect();
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").into(),
        git_commit: provider.revision().unwrap_or_else(|| "unknown".into()),
        rustc: provider
            .toolchain()
            .unwrap_or_else(|| "rustc unavailable".into()),
        crates,
    }
}
