//! matchday - Live football fixtures with AI-generated match insights
//!
//! Entry point for the matchday CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use matchday::cli::commands;
use matchday::cli::{Cli, Commands};
use matchday::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            commands::print_completions(shell, &mut std::io::stdout());
        }
        command => {
            // Load configuration only for runtime commands.
            let settings = Settings::load()?;

            match command {
                Commands::Generate { fixture, json } => {
                    commands::generate_insights(&settings, fixture, json).await?;
                }
                Commands::Invoke { function, event } => {
                    commands::invoke(&settings, function, event).await?;
                }
                Commands::Ingest => {
                    commands::ingest_live_fixtures(&settings).await?;
                }
                Commands::List => {
                    commands::list_fixtures(&settings)?;
                }
                Commands::View { id } => {
                    commands::view_fixture(&settings, &id)?;
                }
                Commands::Config(config_cmd) => {
                    commands::config_command(&settings, config_cmd)?;
                }
                Commands::Completions { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
