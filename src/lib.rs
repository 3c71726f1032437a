//! matchday - Live football fixture cache with AI-generated match insights
//!
//! Fixtures are pulled from the live feed into a local SQLite cache; the
//! insight pipeline turns each cached fixture into a short match summary.

pub mod cli;
pub mod config;
pub mod feed;
pub mod handler;
pub mod llm;
pub mod pipeline;
pub mod storage;

#[cfg(test)]
mod test_support;

use thiserror::Error;

/// Main error type for matchday
#[derive(Error, Debug)]
pub enum MatchdayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, MatchdayError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "matchday";
