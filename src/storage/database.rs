//! SQLite fixture cache

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::config::Settings;
use crate::storage::models::{FixtureRecord, Goals, Insight, MatchEvent, Teams};
use crate::MatchdayError;

/// Database wrapper for matchday
///
/// The connection sits behind a mutex so one handle can be shared by the
/// pipeline workers; it is only held for the duration of a statement.
pub struct Database {
    conn: Mutex<Connection>,
}

const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Match data as serialized into the `data` column
#[derive(Serialize, Deserialize)]
struct StoredMatch {
    teams: Teams,
    goals: Goals,
    #[serde(default)]
    events: Vec<MatchEvent>,
}

struct FixtureRow {
    fixture_id: String,
    data: String,
    insight: Option<String>,
    insight_generated_at: Option<String>,
}

impl Database {
    /// Open or create the database
    pub fn open(settings: &Settings) -> Result<Self> {
        let db_path = settings.database_path();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::open_path(&db_path)
    }

    /// Open database at a specific path (useful for testing)
    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        let db = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        db.initialize()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Database connection lock poisoned"))
    }

    /// Initialize database schema
    fn initialize(&self) -> Result<()> {
        let current_version = self.schema_version()?;
        if current_version > CURRENT_SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is newer than supported version {}",
                current_version,
                CURRENT_SCHEMA_VERSION
            );
        }

        if current_version < 1 {
            self.migrate_to_v1()?;
            self.set_schema_version(1)?;
        }

        Ok(())
    }

    /// Current schema version tracked in PRAGMA user_version.
    pub fn schema_version(&self) -> Result<i64> {
        Ok(self
            .conn()?
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?)
    }

    fn set_schema_version(&self, version: i64) -> Result<()> {
        self.conn()?
            .execute_batch(&format!("PRAGMA user_version = {};", version))?;
        Ok(())
    }

    fn migrate_to_v1(&self) -> Result<()> {
        self.conn()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS fixtures (
                fixture_id TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                insight TEXT,
                insight_generated_at TEXT,
                updated_at INTEGER NOT NULL,
                CHECK ((insight IS NULL) = (insight_generated_at IS NULL))
            );
            "#,
        )?;

        Ok(())
    }

    /// Insert a fixture or replace its match data.
    ///
    /// An existing insight is left in place until the next generation run.
    pub fn upsert_fixture(&self, record: &FixtureRecord) -> Result<()> {
        let conn = self.conn()?;
        Self::upsert_with(&conn, record)
    }

    /// Upsert a batch of fixtures in one transaction
    pub fn upsert_fixtures(&self, records: &[FixtureRecord]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for record in records {
            Self::upsert_with(&tx, record)?;
        }

        tx.commit()?;
        Ok(records.len())
    }

    fn upsert_with(conn: &Connection, record: &FixtureRecord) -> Result<()> {
        let data = serde_json::to_string(&StoredMatch {
            teams: record.teams.clone(),
            goals: record.goals,
            events: record.events.clone(),
        })?;

        conn.execute(
            r#"
            INSERT INTO fixtures (fixture_id, data, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(fixture_id) DO UPDATE
                SET data = excluded.data, updated_at = excluded.updated_at
            "#,
            params![record.fixture_id, data, Utc::now().timestamp()],
        )?;

        Ok(())
    }

    /// Get a fixture by ID
    pub fn get_fixture(&self, fixture_id: &str) -> Result<Option<FixtureRecord>> {
        let row = self
            .conn()?
            .query_row(
                "SELECT fixture_id, data, insight, insight_generated_at FROM fixtures WHERE fixture_id = ?1",
                params![fixture_id],
                Self::read_row,
            )
            .optional()?;

        row.map(Self::row_to_fixture).transpose()
    }

    /// All fixtures ordered by fixture ID
    pub fn list_fixtures(&self) -> Result<Vec<FixtureRecord>> {
        let rows = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(
                "SELECT fixture_id, data, insight, insight_generated_at
                 FROM fixtures
                 ORDER BY fixture_id ASC",
            )?;
            let rows = stmt
                .query_map([], Self::read_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        rows.into_iter().map(Self::row_to_fixture).collect()
    }

    /// Set the insight text and its generation time in one statement.
    ///
    /// Fails with `NotFound` when the fixture does not exist.
    pub fn update_insight(
        &self,
        fixture_id: &str,
        insight: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<()> {
        let changed = self.conn()?.execute(
            "UPDATE fixtures SET insight = ?2, insight_generated_at = ?3 WHERE fixture_id = ?1",
            params![
                fixture_id,
                insight,
                generated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;

        if changed == 0 {
            return Err(MatchdayError::NotFound(format!("fixture {}", fixture_id)).into());
        }

        Ok(())
    }

    fn read_row(row: &rusqlite::Row) -> rusqlite::Result<FixtureRow> {
        Ok(FixtureRow {
            fixture_id: row.get(0)?,
            data: row.get(1)?,
            insight: row.get(2)?,
            insight_generated_at: row.get(3)?,
        })
    }

    fn row_to_fixture(row: FixtureRow) -> Result<FixtureRecord> {
        let data: StoredMatch = serde_json::from_str(&row.data)
            .with_context(|| format!("Corrupt match data for fixture {}", row.fixture_id))?;

        let insight = match (row.insight, row.insight_generated_at) {
            (Some(text), Some(ts)) => Some(Insight {
                text,
                generated_at: DateTime::parse_from_rfc3339(&ts)
                    .with_context(|| {
                        format!("Invalid insight timestamp for fixture {}", row.fixture_id)
                    })?
                    .with_timezone(&Utc),
            }),
            _ => None,
        };

        Ok(FixtureRecord {
            fixture_id: row.fixture_id,
            teams: data.teams,
            goals: data.goals,
            events: data.events,
            insight,
        })
    }

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let conn = self.conn()?;

        let total_fixtures: i64 =
            conn.query_row("SELECT COUNT(*) FROM fixtures", [], |row| row.get(0))?;

        let with_insight: i64 = conn.query_row(
            "SELECT COUNT(*) FROM fixtures WHERE insight IS NOT NULL",
            [],
            |row| row.get(0),
        )?;

        Ok(DatabaseStats {
            total_fixtures: total_fixtures as usize,
            with_insight: with_insight as usize,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub total_fixtures: usize,
    pub with_insight: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(id: &str) -> FixtureRecord {
        FixtureRecord::new(id, "Arsenal", "Chelsea", Goals { home: 2, away: 1 }).with_events(
            vec![
                MatchEvent::new(10, "Arsenal", "Saka", "Goal"),
                MatchEvent::new(45, "Chelsea", "Palmer", "Goal"),
            ],
        )
    }

    #[test]
    fn test_create_database() {
        let db = Database::open_memory().unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.total_fixtures, 0);
        assert_eq!(db.schema_version().unwrap(), 1);
    }

    #[test]
    fn test_upsert_and_get_fixture() {
        let db = Database::open_memory().unwrap();
        db.upsert_fixture(&sample("1001")).unwrap();

        let retrieved = db.get_fixture("1001").unwrap().unwrap();
        assert_eq!(retrieved, sample("1001"));
        assert!(db.get_fixture("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_is_ordered_by_fixture_id() {
        let db = Database::open_memory().unwrap();
        db.upsert_fixtures(&[sample("300"), sample("100"), sample("200")])
            .unwrap();

        let ids: Vec<String> = db
            .list_fixtures()
            .unwrap()
            .into_iter()
            .map(|f| f.fixture_id)
            .collect();
        assert_eq!(ids, vec!["100", "200", "300"]);
    }

    #[test]
    fn test_update_insight_sets_text_and_timestamp() {
        let db = Database::open_memory().unwrap();
        db.upsert_fixture(&sample("7")).unwrap();

        let at = Utc.with_ymd_and_hms(2024, 5, 19, 17, 30, 0).unwrap();
        db.update_insight("7", "Arsenal edged it.", at).unwrap();

        let insight = db.get_fixture("7").unwrap().unwrap().insight.unwrap();
        assert_eq!(insight.text, "Arsenal edged it.");
        assert_eq!(insight.generated_at, at);
        assert_eq!(db.get_stats().unwrap().with_insight, 1);
    }

    #[test]
    fn test_update_insight_on_missing_fixture_fails() {
        let db = Database::open_memory().unwrap();

        let err = db.update_insight("nope", "text", Utc::now()).unwrap_err();
        assert!(err.to_string().contains("Not found"));
        assert_eq!(db.get_stats().unwrap().total_fixtures, 0);
    }

    #[test]
    fn test_upsert_keeps_existing_insight() {
        let db = Database::open_memory().unwrap();
        db.upsert_fixture(&sample("9")).unwrap();
        db.update_insight("9", "First half report", Utc::now())
            .unwrap();

        let mut updated = sample("9");
        updated.goals = Goals { home: 3, away: 1 };
        db.upsert_fixture(&updated).unwrap();

        let stored = db.get_fixture("9").unwrap().unwrap();
        assert_eq!(stored.goals, Goals { home: 3, away: 1 });
        assert_eq!(stored.insight.unwrap().text, "First half report");
    }

    #[test]
    fn test_half_set_insight_pair_is_rejected() {
        let db = Database::open_memory().unwrap();
        db.upsert_fixture(&sample("5")).unwrap();

        let result = db.conn().unwrap().execute(
            "UPDATE fixtures SET insight = 'orphan' WHERE fixture_id = '5'",
            [],
        );
        assert!(result.is_err());
        assert!(db.get_fixture("5").unwrap().unwrap().insight.is_none());
    }
}
