//! API-Football payload shapes

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::storage::{FixtureRecord, Goals, MatchEvent};

#[derive(Debug, Deserialize)]
struct LiveFixturesEnvelope {
    #[serde(default)]
    response: Vec<Value>,
}

/// One entry of the `response` array of `fixtures?live=all`
#[derive(Debug, Deserialize)]
pub struct UpstreamFixture {
    fixture: FixtureInfo,
    teams: UpstreamTeams,
    goals: UpstreamGoals,
    #[serde(default)]
    events: Option<Vec<UpstreamEvent>>,
}

#[derive(Debug, Deserialize)]
struct FixtureInfo {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct UpstreamTeams {
    home: NamedRef,
    away: NamedRef,
}

#[derive(Debug, Default, Deserialize)]
struct NamedRef {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamGoals {
    home: Option<u32>,
    away: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct UpstreamEvent {
    time: EventTime,
    #[serde(default)]
    team: NamedRef,
    #[serde(default)]
    player: NamedRef,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct EventTime {
    elapsed: Option<i32>,
}

impl NamedRef {
    fn into_name(self) -> String {
        self.name.unwrap_or_default()
    }
}

impl From<UpstreamFixture> for FixtureRecord {
    fn from(upstream: UpstreamFixture) -> Self {
        // Goals are null before kick-off.
        let goals = Goals {
            home: upstream.goals.home.unwrap_or(0),
            away: upstream.goals.away.unwrap_or(0),
        };

        let events = upstream
            .events
            .unwrap_or_default()
            .into_iter()
            .map(|e| MatchEvent {
                elapsed_minutes: e.time.elapsed.unwrap_or(0),
                team: e.team.into_name(),
                player: e.player.into_name(),
                event_type: e.kind,
            })
            .collect();

        FixtureRecord::new(
            upstream.fixture.id.to_string(),
            upstream.teams.home.into_name(),
            upstream.teams.away.into_name(),
            goals,
        )
        .with_events(events)
    }
}

/// Convert a live fixtures payload into cache records.
///
/// Entries that do not look like fixtures are logged and left out.
pub fn parse_live_fixtures(payload: &Value) -> Result<Vec<FixtureRecord>> {
    let envelope = LiveFixturesEnvelope::deserialize(payload)
        .context("Live feed payload has no fixtures response")?;

    let mut records = Vec::with_capacity(envelope.response.len());
    for (index, entry) in envelope.response.into_iter().enumerate() {
        match serde_json::from_value::<UpstreamFixture>(entry) {
            Ok(fixture) => records.push(fixture.into()),
            Err(e) => tracing::warn!(index, error = %e, "Skipping malformed live fixture"),
        }
    }

    Ok(records)
}
