use crate::storage::FixtureRecord;

/// Text used in place of the event list when a fixture has no events.
pub const NO_EVENTS_FALLBACK: &str = "No major events recorded.";

/// Build a deterministic summary prompt for a fixture.
pub fn build_fixture_prompt(record: &FixtureRecord) -> String {
    let home = &record.teams.home;
    let away = &record.teams.away;
    let score = format!("{}-{}", record.goals.home, record.goals.away);

    let events = if record.events.is_empty() {
        NO_EVENTS_FALLBACK.to_string()
    } else {
        record
            .events
            .iter()
            .map(|e| {
                let minute = format!("{}'", e.elapsed_minutes);
                [
                    minute.as_str(),
                    e.team.as_str(),
                    e.player.as_str(),
                    e.event_type.as_str(),
                ]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
            })
            .collect::<Vec<_>>()
            .join("; ")
    };

    format!(
        "Summarize the soccer match between {home} and {away} which ended {score}. \
Key events: {events}. \
Provide a concise, engaging summary."
    )
}
