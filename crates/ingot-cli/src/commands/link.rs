//! `ingot link`: drive the full native build pipeline.
use anyhow::Result;
use clap::Args;
use ingot_build::{BuildConfig, Builder, DriverStages, GarbageCollector, Mode};
use std::path::PathBuf;

#[derive(Args)]
pub struct LinkArgs {
    /// Classpath of IR artifacts, colon-separated
    #[arg(long, value_delimiter = ':', required = true)]
    pub classpath: Vec<PathBuf>,

    /// Work directory for build artifacts
    #[arg(long, default_value = "target/native")]
    pub workdir: PathBuf,

    /// Fully-qualified entry-point symbol
    #[arg(long = "main")]
    pub entry_point: String,

    /// Garbage collector: none, boehm, immix
    #[arg(long, default_value = "immix")]
    pub gc: String,

    /// Build with release optimizations
    #[arg(long)]
    pub release: bool,

    /// C compiler override (takes precedence over CLANG_PATH)
    #[arg(long)]
    pub clang: Option<PathBuf>,

    /// C++ compiler override (takes precedence over CLANGPP_PATH)
    #[arg(long)]
    pub clangpp: Option<PathBuf>,

    /// IR driver executable providing the link/optimize/codegen stages
    #[arg(long, env = "INGOT_IR_DRIVER")]
    pub ir_driver: PathBuf,

    /// Verbose output with stage timing
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

pub fn run(args: LinkArgs) -> Result<()> {
    let gc = GarbageCollector::parse(&args.gc)?;
    let mode = if args.release {
        Mode::Release
    } else {
        Mode::Debug
    };

    let config = BuildConfig::discover_with(
        args.classpath,
        args.workdir,
        args.entry_point,
        args.clang,
        args.clangpp,
    )?
    .with_gc(gc)
    .with_mode(mode)
    .with_verbose(args.verbose);

    let stages = DriverStages::new(args.ir_driver);
    let mut builder = Builder::new(config, stages);
    let out = builder.link()?;
    println!("{}", out.display());
    Ok(())
}
