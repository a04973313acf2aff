//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{init_cmd, plugin_cmd, rank_cmd};
use crate::config::{self, Config};

#[derive(Parser)]
#[command(name = "guildtrack")]
#[command(author, version, about = "Plugin-driven utilities for community game tracking")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config's default_format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a guildtrack project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage plugins
    #[command(subcommand)]
    Plugin(plugin_cmd::PluginCommands),

    /// Compute battle rankings through the plugin pipeline
    Rank {
        /// Folder with battle result JSON files (overrides config)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output JSON file (overrides config)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;
    let format = cli.format.unwrap_or(match config.global.default_format {
        config::OutputFormat::Text => OutputFormat::Text,
        config::OutputFormat::Json => OutputFormat::Json,
    });
    let output = Output::new(format);

    match cli.command {
        Commands::Init { path } => init_cmd::run(&path, &output),
        Commands::Plugin(cmd) => plugin_cmd::run(cmd, &config, &output),
        Commands::Rank { input, output: out_file } => {
            rank_cmd::run(input, out_file, &config, &output)
        }
    }
}

/// Logs go to stderr so stdout stays parseable; `RUST_LOG` wins over the
/// verbosity flag.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "info,guildtrack=debug"
    } else {
        "warn,guildtrack=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
