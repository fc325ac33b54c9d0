//! `ingot fetch`: acquire a named tool and its dependencies.
use anyhow::Result;
use clap::Args;
use ingot_fetch::{download_all, HttpRepositories, Resolver, ToolsManifest};
use std::path::PathBuf;

#[derive(Args)]
pub struct FetchArgs {
    /// Tool name as listed in the tools manifest
    pub tool: String,

    /// Tools manifest URL
    #[arg(
        long,
        env = "INGOT_TOOLS_MANIFEST",
        default_value = "https://tools.ingot-build.dev/manifest.json"
    )]
    pub manifest_url: String,

    /// Directory the artifact jars are downloaded into
    #[arg(long, default_value = ".ingot/tools")]
    pub out: PathBuf,
}

pub fn run(args: FetchArgs) -> Result<()> {
    let manifest = ToolsManifest::fetch(&args.manifest_url)?;
    let entry = manifest.tool(&args.tool)?;

    let repositories = HttpRepositories::new(manifest.repositories.clone());
    let resolved = Resolver::new(&repositories).resolve(&entry.coordinates)?;
    println!(
        "Resolved {} artifacts for {} ({})",
        resolved.len(),
        args.tool,
        entry.coordinates
    );

    let paths = download_all(&repositories, &resolved, &args.out)?;
    for path in &paths {
        println!("{}", path.display());
    }
    Ok(())
}
