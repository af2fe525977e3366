use clap::Args;
use serde::Serialize;
use tb_core::{to_canonical_json_string, TbError};
use tb_run::{load_raw, RunHashes};

use super::ProjectArgs;

#[derive(Args, Debug)]
pub struct HashArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Debug, Serialize)]
struct HashReport {
    hashes: RunHashes,
    digests: RunHashes,
    run_dir: String,
}

pub fn run(args: &HashArgs) -> Result<(), TbError> {
    let layout = args.project.layout();
    let loaded = load_raw(&layout.config_path(&args.project.config))?;
    let config = loaded.parse()?;
    config.validate()?;
    let lattice = config.build_geometry()?;
    let identity = layout.resolve(
        &lattice,
        &config.physics,
        Some(&config.solver),
        args.project.hash_length,
    )?;
    let report = HashReport {
        run_dir: layout.run_dir(&identity).display().to_string(),
        hashes: identity.hashes,
        digests: identity.digests,
    };
    println!("{}", to_canonical_json_string(&report)?);
    Ok(())
}
