//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::MatchdayError;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Text-generation backend settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Live feed settings
    #[serde(default)]
    pub feed: FeedSettings,

    /// Insight pipeline settings
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Data directory for the fixture cache
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// AWS region of the Bedrock runtime
    #[serde(default = "default_llm_region")]
    pub region: String,

    /// Bedrock model identifier
    #[serde(default = "default_llm_model_id")]
    pub model_id: String,

    /// Bedrock API key (bearer token)
    #[serde(default)]
    pub api_key: String,

    /// Runtime endpoint override (empty = regional Bedrock endpoint)
    #[serde(default)]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    /// API-Football base URL
    #[serde(default = "default_feed_endpoint")]
    pub endpoint: String,

    /// API-Football key
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Maximum fixtures processed concurrently (also caps backend calls in flight)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Stop starting new fixtures after this many seconds (0 = no deadline)
    #[serde(default)]
    pub deadline_secs: u64,
}

// Default value functions

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "matchday", "matchday")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/matchday"))
}

fn default_llm_region() -> String {
    "us-east-1".to_string()
}

fn default_llm_model_id() -> String {
    "anthropic.claude-v2".to_string()
}

fn default_llm_timeout() -> u64 {
    45
}

fn default_feed_endpoint() -> String {
    "https://v3.football.api-sports.io".to_string()
}

fn default_feed_timeout() -> u64 {
    15
}

fn default_concurrency() -> usize {
    4
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            region: default_llm_region(),
            model_id: default_llm_model_id(),
            api_key: String::new(),
            endpoint: String::new(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            endpoint: default_feed_endpoint(),
            api_key: String::new(),
            timeout_secs: default_feed_timeout(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            deadline_secs: 0,
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            toml::from_str::<Settings>(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            tracing::debug!("No config file found, using defaults");
            Self::default()
        };

        settings.apply_env_overrides(|name| std::env::var(name).ok());
        settings.validate()?;

        Ok(settings)
    }

    /// Apply environment variable overrides.
    ///
    /// Keys only fill in blanks left by the config file; the model id always
    /// wins when set.
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.llm.api_key.trim().is_empty() {
            if let Some(key) =
                non_empty("MATCHDAY_LLM_API_KEY").or_else(|| non_empty("AWS_BEARER_TOKEN_BEDROCK"))
            {
                self.llm.api_key = key;
            }
        }

        if let Some(model_id) = non_empty("BEDROCK_MODEL_ID") {
            self.llm.model_id = model_id;
        }

        if self.feed.api_key.trim().is_empty() {
            if let Some(key) = non_empty("API_FOOTBALL_KEY") {
                self.feed.api_key = key;
            }
        }
    }

    /// Reject settings that can never produce a working run.
    pub fn validate(&self) -> crate::Result<()> {
        if self.pipeline.concurrency == 0 {
            return Err(MatchdayError::Config(
                "pipeline.concurrency must be at least 1".to_string(),
            ));
        }
        if self.llm.model_id.trim().is_empty() {
            return Err(MatchdayError::Config(
                "llm.model_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "matchday", "matchday")
            .context("Could not determine config directory")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &PathBuf) -> Result<()> {
        let content = toml::to_string_pretty(&Self::default())?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the database path
    pub fn database_path(&self) -> PathBuf {
        self.general.data_dir.join("matchday.db")
    }
}
