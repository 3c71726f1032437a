//! CLI argument definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// matchday - Live football fixtures with AI-generated match insights
#[derive(Parser, Debug)]
#[command(name = "matchday")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate insights for cached fixtures
    Generate {
        /// Only this fixture (defaults to every cached fixture)
        #[arg(short, long)]
        fixture: Option<String>,

        /// Print the full run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an entrypoint and print its response envelope
    Invoke {
        /// Entrypoint to run
        #[arg(value_enum)]
        function: Function,

        /// Trigger event as JSON (e.g. '{"fixtureId": "42"}')
        #[arg(short, long)]
        event: Option<String>,
    },

    /// Fetch live fixtures and store them in the cache
    Ingest,

    /// List cached fixtures
    List,

    /// Show a cached fixture and its insight
    View {
        /// Fixture ID
        id: String,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    /// Summarize cached fixtures
    GenerateInsights,
    /// Pass through the upstream live fixtures payload
    FetchMatchData,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
