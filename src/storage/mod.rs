//! Storage module for matchday
//!
//! Caches fixtures and their generated insights in SQLite.

mod database;
mod models;
mod store;

pub use database::{Database, DatabaseStats};
pub use models::{FixtureRecord, Goals, Insight, MatchEvent, Teams};
pub use store::FixtureStore;
