//! refmaster CLI - reference-based mastering from the command line.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "refmaster")]
#[command(author, version, about = "Reference-based audio mastering", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Master a target mix against a reference track
    Master(commands::master::MasterArgs),

    /// Analyze an audio file
    Analyze(commands::analyze::AnalyzeArgs),

    /// List, show and export mastering profiles
    Profiles(commands::profiles::ProfilesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Master(args) => commands::master::run(args),
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Profiles(args) => commands::profiles::run(args),
    }
}
