//! Insight pipeline
//!
//! Selects fixtures from the store, asks the generator for a summary of each
//! and writes the summaries back.

mod clock;
mod locks;
mod orchestrator;

pub use clock::{Clock, SystemClock};
pub use locks::FixtureLocks;
pub use orchestrator::Orchestrator;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Which fixtures one run should cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    /// A single fixture; an unknown ID yields an empty run
    Fixture(String),
    /// Every cached fixture
    All,
}

impl From<Option<String>> for GenerationRequest {
    fn from(fixture_id: Option<String>) -> Self {
        match fixture_id {
            Some(id) if !id.is_empty() => Self::Fixture(id),
            _ => Self::All,
        }
    }
}

impl fmt::Display for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixture(id) => write!(f, "fixture {}", id),
            Self::All => f.write_str("all fixtures"),
        }
    }
}

/// A freshly generated insight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResult {
    pub fixture_id: String,
    pub insight: String,
}

/// A fixture that was skipped because its generation or write failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureFailure {
    pub fixture_id: String,
    pub reason: String,
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: Uuid,
    /// Successful fixtures, ascending by fixture ID
    pub results: Vec<InsightResult>,
    pub failures: Vec<FixtureFailure>,
    /// Fixtures never started because the run was cancelled
    pub skipped: usize,
}

impl RunReport {
    pub fn into_results(self) -> Vec<InsightResult> {
        self.results
    }
}

/// Pipeline error taxonomy.
///
/// `Generation` and `Store` are per-fixture and end up in
/// [`RunReport::failures`]; `StoreRead` and `Fatal` abort the whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Insight generation failed for fixture {fixture_id}: {cause:#}")]
    Generation {
        fixture_id: String,
        cause: anyhow::Error,
    },

    #[error("Failed to store insight for fixture {fixture_id}: {cause:#}")]
    Store {
        fixture_id: String,
        cause: anyhow::Error,
    },

    #[error("Failed to read fixtures: {0:#}")]
    StoreRead(anyhow::Error),

    #[error("{0:#}")]
    Fatal(anyhow::Error),
}

impl PipelineError {
    /// Whether this error ends the whole run rather than a single fixture
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StoreRead(_) | Self::Fatal(_))
    }
}
