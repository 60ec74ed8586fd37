//! ugenkit CLI - run smoothers, filters and reverbs over audio files.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ugenkit")]
#[command(author, version, about = "ugenkit unit generator CLI", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process an audio file through a unit
    Process(commands::process::ProcessArgs),

    /// Render the impulse response of a unit
    Impulse(commands::impulse::ImpulseArgs),

    /// List available units and their parameters
    Units(commands::units::UnitsArgs),

    /// List, show or export factory presets
    Presets(commands::presets::PresetsArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Impulse(args) => commands::impulse::run(args),
        Commands::Units(args) => commands::units::run(args),
        Commands::Presets(args) => commands::presets::run(args),
    }
}
