//! CiThruS CLI - run and inspect cithrus pipelines.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cithrus")]
#[command(author, version, about = "CiThruS pipeline runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a pipeline from a config file and run it
    Run(commands::run::RunArgs),

    /// Check a pipeline config without running it
    Validate(commands::validate::ValidateArgs),

    /// List available components and their parameters
    Components(commands::components::ComponentsArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so machine-readable output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Components(args) => commands::components::run(args),
    }
}
