//! CLI command implementations

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::Shell;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::cli::args::{Cli, ConfigCommand, Function};
use crate::config::Settings;
use crate::feed::{parse_live_fixtures, LiveFeedFetcher};
use crate::handler::{self, GenerateEvent, InvocationResponse};
use crate::llm::build_generator;
use crate::pipeline::{GenerationRequest, Orchestrator, PipelineError};
use crate::storage::{Database, FixtureRecord};

/// Generate insights for one or all cached fixtures
pub async fn generate_insights(settings: &Settings, fixture: Option<String>, json: bool) -> Result<()> {
    let orchestrator = build_orchestrator(settings)?;
    let cancel = run_cancellation(settings);

    let report = orchestrator
        .run(&GenerationRequest::from(fixture), &cancel)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.results.is_empty() && report.failures.is_empty() && report.skipped == 0 {
        println!("No fixtures to summarize");
        return Ok(());
    }

    for result in &report.results {
        println!("== {} ==", result.fixture_id);
        println!("{}", result.insight);
        println!();
    }

    for failure in &report.failures {
        eprintln!("Failed {}: {}", failure.fixture_id, failure.reason);
    }

    if report.skipped > 0 {
        eprintln!("Cancelled: {} fixtures not processed", report.skipped);
    }

    println!(
        "{} insights generated, {} failed",
        report.results.len(),
        report.failures.len()
    );

    Ok(())
}

/// Run an entrypoint and print its response envelope
pub async fn invoke(settings: &Settings, function: Function, event: Option<String>) -> Result<()> {
    let response = match function {
        Function::GenerateInsights => {
            let event: GenerateEvent = match event.as_deref() {
                Some(raw) => serde_json::from_str(raw).context("Invalid event JSON")?,
                None => GenerateEvent::default(),
            };

            match build_orchestrator(settings) {
                Ok(orchestrator) => {
                    let cancel = run_cancellation(settings);
                    handler::generate_insights(&orchestrator, event, &cancel).await
                }
                Err(e) => PipelineError::Fatal(e).into(),
            }
        }
        Function::FetchMatchData => match LiveFeedFetcher::from_settings(settings) {
            Ok(fetcher) => handler::fetch_match_data(&fetcher).await,
            Err(e) => InvocationResponse::error(format!("{:#}", e)),
        },
    };

    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_success() {
        anyhow::bail!("Invocation failed with status {}", response.status_code);
    }

    Ok(())
}

/// Fetch live fixtures and upsert them into the cache
pub async fn ingest_live_fixtures(settings: &Settings) -> Result<()> {
    let fetcher = LiveFeedFetcher::from_settings(settings)?;
    let payload = fetcher.fetch_live().await?;
    let records = parse_live_fixtures(&payload)?;

    let db = Database::open(settings)?;
    let count = db.upsert_fixtures(&records)?;

    println!("Cached {} live fixtures", count);
    Ok(())
}

/// List cached fixtures
pub fn list_fixtures(settings: &Settings) -> Result<()> {
    let db = Database::open(settings)?;
    let fixtures = db.list_fixtures()?;

    if fixtures.is_empty() {
        println!("No fixtures cached");
        return Ok(());
    }

    println!("{:<12} {:<40} {:<7} {:<20}", "ID", "Match", "Score", "Insight");
    println!("{}", "-".repeat(82));

    for fixture in fixtures {
        let insight = fixture
            .insight
            .as_ref()
            .map(|i| i.generated_at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<40} {:<7} {:<20}",
            fixture.fixture_id,
            truncate(&format!("{} vs {}", fixture.teams.home, fixture.teams.away), 38),
            format_score(&fixture),
            insight
        );
    }

    Ok(())
}

/// Show one cached fixture
pub fn view_fixture(settings: &Settings, id: &str) -> Result<()> {
    let db = Database::open(settings)?;

    let fixture = db.get_fixture(id)?.context("Fixture not found")?;

    println!("Fixture: {}", fixture.fixture_id);
    println!(
        "Match: {} vs {} ({})",
        fixture.teams.home,
        fixture.teams.away,
        format_score(&fixture)
    );
    println!();

    if fixture.events.is_empty() {
        println!("(No events recorded)");
    }
    for event in &fixture.events {
        println!(
            "{:>3}' {:<10} {} ({})",
            event.elapsed_minutes, event.event_type, event.player, event.team
        );
    }

    if let Some(insight) = &fixture.insight {
        println!();
        println!(
            "Insight ({}):",
            insight.generated_at.format("%Y-%m-%d %H:%M UTC")
        );
        println!("{}", insight.text);
    }

    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let mut redacted = settings.clone();
            redact(&mut redacted.llm.api_key);
            redact(&mut redacted.feed.api_key);
            println!("{}", toml::to_string_pretty(&redacted)?);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

/// Write the completion script for `shell`.
pub fn print_completions<W: Write>(shell: Shell, out: &mut W) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, out);
}

fn build_orchestrator(settings: &Settings) -> Result<Orchestrator> {
    let db = Arc::new(Database::open(settings)?);
    let generator = Arc::new(build_generator(settings)?);
    Ok(Orchestrator::from_settings(settings, db, generator))
}

/// Token cancelled on Ctrl-C or when the configured deadline passes.
fn run_cancellation(settings: &Settings) -> CancellationToken {
    let token = CancellationToken::new();

    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, letting in-flight fixtures finish");
            interrupt.cancel();
        }
    });

    if settings.pipeline.deadline_secs > 0 {
        let deadline = token.clone();
        let secs = settings.pipeline.deadline_secs;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            warn!(deadline_secs = secs, "Run deadline reached");
            deadline.cancel();
        });
    }

    token
}

// Helper functions

fn format_score(fixture: &FixtureRecord) -> String {
    format!("{}-{}", fixture.goals.home, fixture.goals.away)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn redact(secret: &mut String) {
    if !secret.is_empty() {
        *secret = "********".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("Borussia Mönchengladbach", 10), "Borussi...");
        assert_eq!(truncate("Ajax", 10), "Ajax");
    }

    #[test]
    fn completions_mention_binary_name() {
        let mut out = Vec::new();
        print_completions(Shell::Bash, &mut out);
        assert!(String::from_utf8_lossy(&out).contains("matchday"));
    }
}
