//! Data models for storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Home and away team names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teams {
    pub home: String,
    pub away: String,
}

/// Goals scored so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    pub home: u32,
    pub away: u32,
}

/// A key moment of a match (goal, card, substitution, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEvent {
    /// Minute of play the event happened in
    pub elapsed_minutes: i32,

    /// Team the event is credited to
    pub team: String,

    /// Player involved
    pub player: String,

    /// Upstream event type ("Goal", "Card", "subst", "Var")
    pub event_type: String,
}

impl MatchEvent {
    pub fn new(
        elapsed_minutes: i32,
        team: impl Into<String>,
        player: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            elapsed_minutes,
            team: team.into(),
            player: player.into(),
            event_type: event_type.into(),
        }
    }
}

/// A generated match summary together with the time it was produced.
///
/// Text and timestamp only ever travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub text: String,
    pub generated_at: DateTime<Utc>,
}

/// One cached fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureRecord {
    /// Upstream fixture identifier (primary key)
    pub fixture_id: String,

    pub teams: Teams,

    pub goals: Goals,

    /// Events in chronological order
    #[serde(default)]
    pub events: Vec<MatchEvent>,

    /// Latest generated insight, if any
    #[serde(default)]
    pub insight: Option<Insight>,
}

impl FixtureRecord {
    /// Create a record with no events and no insight
    pub fn new(
        fixture_id: impl Into<String>,
        home: impl Into<String>,
        away: impl Into<String>,
        goals: Goals,
    ) -> Self {
        Self {
            fixture_id: fixture_id.into(),
            teams: Teams {
                home: home.into(),
                away: away.into(),
            },
            goals,
            events: Vec::new(),
            insight: None,
        }
    }

    pub fn with_events(mut self, events: Vec<MatchEvent>) -> Self {
        self.events = events;
        self
    }
}
