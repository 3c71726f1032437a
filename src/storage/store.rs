//! Store interface consumed by the insight pipeline

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::storage::{Database, FixtureRecord};

/// Fixture storage as seen by the pipeline: point lookup, full scan and the
/// one mutation the pipeline is allowed to make.
pub trait FixtureStore: Send + Sync {
    /// Look up a single fixture
    fn get(&self, fixture_id: &str) -> Result<Option<FixtureRecord>>;

    /// Every fixture, ascending by fixture ID
    fn scan_all(&self) -> Result<Vec<FixtureRecord>>;

    /// Atomically replace the insight pair of an existing fixture
    fn update_insight(
        &self,
        fixture_id: &str,
        insight: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<()>;
}

impl FixtureStore for Database {
    fn get(&self, fixture_id: &str) -> Result<Option<FixtureRecord>> {
        self.get_fixture(fixture_id)
    }

    fn scan_all(&self) -> Result<Vec<FixtureRecord>> {
        self.list_fixtures()
    }

    fn update_insight(
        &self,
        fixture_id: &str,
        insight: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<()> {
        Database::update_insight(self, fixture_id, insight, generated_at)
    }
}
