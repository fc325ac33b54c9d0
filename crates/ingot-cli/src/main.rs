use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

/// Ingot native build orchestrator.
///
/// Takes compiled intermediate-representation artifacts on a classpath and
/// drives the staged pipeline down to a single native executable. Also
/// fetches prebuilt tools declared in a remote manifest.
///
/// EXAMPLES:
///     ingot link --classpath app.jar:runtimelib.jar --main app.Main
///     ingot link --classpath app.jar:runtimelib.jar --main app.Main --gc boehm --release
///     ingot fetch fmt
///     ingot clean --workdir target/native
///
/// ENVIRONMENT VARIABLES:
///     CLANG_PATH             C compiler override, used verbatim
///     CLANGPP_PATH           C++ compiler override, used verbatim
///     INGOT_IR_DRIVER        IR link/optimize/codegen driver executable
///     INGOT_TOOLS_MANIFEST   Tools manifest URL for `ingot fetch`
#[derive(Parser)]
#[command(name = "ingot")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Link classpath IR into a native executable
    ///
    /// Runs IR link, optimize, and codegen through the configured driver,
    /// compiles the generated units and the bundled runtime-support sources,
    /// and links everything into `<workdir>/out`.
    #[command(visible_alias = "build")]
    Link(commands::link::LinkArgs),

    /// Fetch a named tool and its dependency graph
    ///
    /// Looks the tool up in the remote tools manifest, resolves its
    /// dependencies against the manifest's repositories, and downloads the
    /// artifacts into a local cache directory.
    Fetch(commands::fetch::FetchArgs),

    /// Remove a build work directory
    Clean(commands::clean::CleanArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Link(args) => commands::link::run(args),
        Commands::Fetch(args) => commands::fetch::run(args),
        Commands::Clean(args) => commands::clean::run(args),
    }
}
