//! Configuration module for matchday
//!
//! Handles loading and managing application settings from TOML files.

mod settings;

pub use settings::{FeedSettings, GeneralSettings, LlmSettings, PipelineSettings, Settings};
