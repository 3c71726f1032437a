//! Live feed module for matchday
//!
//! Fetches live fixtures from API-Football and converts them into cache
//! records.

mod fetcher;
mod upstream;

pub use fetcher::LiveFeedFetcher;
pub use upstream::{parse_live_fixtures, UpstreamFixture};
