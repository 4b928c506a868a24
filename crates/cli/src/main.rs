//! Devkit CLI - dk command

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cli_lib::cmd;
use cli_lib::cmd::run::RunOptions;
use cli_lib::config;
use cli_lib::logging::{self, LogCapture};
use std::path::PathBuf;

/// Devkit - live module debugging and update notifications
#[derive(Parser)]
#[command(name = "dk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the watcher, the update poller and the command console
    Run {
        /// Don't poll for updates
        #[arg(long)]
        no_updates: bool,

        /// Repository to watch for updates (overrides updates.repo_path)
        #[arg(long)]
        repo: Option<PathBuf>,
    },
    /// View and edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all values
    List,
    /// Print one value
    Get {
        /// Dotted key, e.g. updates.interval_secs
        key: String,
    },
    /// Set one value
    Set { key: String, value: String },
    /// Show the config file path
    Path {
        /// Create the file with defaults if missing
        #[arg(long)]
        create: bool,
    },
    /// Print the default configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => config::config_file_path().context("Could not determine config file path")?,
    };

    match cli.command {
        Commands::Run { no_updates, repo } => {
            let config = config::load(&config_path)?;
            let capture = LogCapture::new(config.logs.capacity);
            let _guard = logging::init(&config.logs, capture.clone())?;

            cmd::run::run(config, capture, RunOptions { no_updates, repo }).await
        }
        Commands::Config(command) => match command {
            ConfigCommands::List => cmd::config::run_list(&config_path).await,
            ConfigCommands::Get { key } => cmd::config::run_get(&config_path, &key).await,
            ConfigCommands::Set { key, value } => cmd::config::run_set(&config_path, &key, &value).await,
            ConfigCommands::Path { create } => cmd::config::run_path(&config_path, create).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}
