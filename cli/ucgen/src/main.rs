//! ucgen CLI: command-line front end of the platform artifact generator.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use ucgen_targets::{PlatformKind, ProjectManifest};

use commands::generate::{GenerateOptions, ReportFormat};
use manifest::Overrides;

#[derive(Parser)]
#[command(name = "ucgen", version, about = "Platform artifact generator for reactor programs")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project
    Init {
        /// Project name
        name: String,
    },
    /// Generate build descriptors and system configuration
    Generate {
        /// Output directory (default: out/)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Directory holding user overlays (default: the project directory)
        #[arg(long)]
        workspace: Option<PathBuf>,
        /// Override the application-wide platform
        #[arg(long, value_parser = manifest::parse_platform)]
        platform: Option<PlatformKind>,
        /// Override the application-wide board
        #[arg(long)]
        board: Option<String>,
        /// Print the generation report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the project manifest
    Check {
        /// Override the application-wide platform
        #[arg(long, value_parser = manifest::parse_platform)]
        platform: Option<PlatformKind>,
        /// Override the application-wide board
        #[arg(long)]
        board: Option<String>,
    },
    /// Inspect target platforms
    Target {
        #[command(subcommand)]
        action: TargetAction,
    },
    /// Remove generated artifacts
    Clean {
        /// Output directory (default: out/)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TargetAction {
    /// List available platforms
    List,
    /// Show how a platform is generated
    Describe {
        /// Platform name
        name: String,
        /// Output format (default: human-readable, "toml" or "json")
        #[arg(long)]
        format: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::Generate {
            out,
            workspace,
            platform,
            board,
            json,
        } => {
            let (manifest, project_dir) = load_manifest(&cwd, &Overrides { platform, board })?;
            let options = GenerateOptions {
                out: out.as_deref(),
                workspace: workspace.as_deref(),
            };
            let format = if json { ReportFormat::Json } else { ReportFormat::Human };
            commands::generate::run(&project_dir, &manifest, &options, format)
        }

        Commands::Check { platform, board } => {
            let (manifest, _) = load_manifest(&cwd, &Overrides { platform, board })?;
            commands::check::run(&manifest)
        }

        Commands::Target { action } => match action {
            TargetAction::List => commands::target::list(),
            TargetAction::Describe { name, format } => {
                commands::target::describe(&name, format.as_deref())
            }
        },

        Commands::Clean { out } => {
            let project_dir = match manifest::find_and_load(&cwd)? {
                Some((_, dir)) => dir,
                None => cwd,
            };
            commands::clean::run(&project_dir, out.as_deref())
        }
    }
}

/// Load the manifest and apply command-line overrides, returning an error if none is found.
fn load_manifest(cwd: &Path, overrides: &Overrides) -> anyhow::Result<(ProjectManifest, PathBuf)> {
    match manifest::find_and_load(cwd)? {
        Some((mut manifest, dir)) => {
            overrides.apply(&mut manifest);
            Ok((manifest, dir))
        }
        None => anyhow::bail!("no {} found (run `ucgen init` first)", manifest::MANIFEST_FILE),
    }
}
