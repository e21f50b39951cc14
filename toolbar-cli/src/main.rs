use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "toolbar", about = "Plugin-driven desktop toolbar")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ~/.config/toolbar/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the toolbar with every enabled plugin
    Run(commands::run::RunArgs),
    /// Manage plugins
    Plugin(commands::plugin::PluginArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = commands::open_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => commands::run::run(args, config).await,
        Commands::Plugin(args) => commands::plugin::run(args, config),
        Commands::Config(args) => commands::config::run(args, config),
    }
}
