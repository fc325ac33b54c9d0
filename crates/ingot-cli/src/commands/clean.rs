//! `ingot clean`: drop a build work directory.
use anyhow::Result;
use clap::Args;
use std::fs;
use std::path::PathBuf;

#[derive(Args)]
pub struct CleanArgs {
    /// Work directory to remove
    #[arg(long, default_value = "target/native")]
    pub workdir: PathBuf,
}

pub fn run(args: CleanArgs) -> Result<()> {
    if args.workdir.exists() {
        fs::remove_dir_all(&args.workdir)?;
        println!("Removed {}", args.workdir.display());
    } else {
        println!("Nothing to clean at {}", args.workdir.display());
    }
    Ok(())
}
