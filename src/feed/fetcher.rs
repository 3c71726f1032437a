use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;

use crate::config::Settings;
use crate::MatchdayError;

const API_KEY_HEADER: &str = "x-apisports-key";

/// Client for the API-Football live fixtures endpoint
pub struct LiveFeedFetcher {
    http: Client,
    api_key: String,
    endpoint: String,
}

impl LiveFeedFetcher {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.feed.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(MatchdayError::Config(
                "API-Football key is missing. Set feed.api_key in config or API_FOOTBALL_KEY."
                    .to_string(),
            )
            .into());
        }

        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(settings.feed.timeout_secs))
                .build()
                .context("Failed to build feed HTTP client")?,
            api_key,
            endpoint: settings.feed.endpoint.trim().trim_end_matches('/').to_string(),
        })
    }

    fn live_url(&self) -> String {
        format!("{}/fixtures?live=all", self.endpoint)
    }

    /// Fetch the live fixtures payload verbatim
    pub async fn fetch_live(&self) -> Result<Value> {
        let response = self
            .http
            .get(self.live_url())
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .context("Live feed request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatchdayError::Feed(format!(
                "upstream returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            ))
            .into());
        }

        let payload: Value = response
            .json()
            .await
            .context("Failed to parse live feed response")?;

        tracing::debug!(
            results = payload.get("results").and_then(serde_json::Value::as_u64).unwrap_or(0),
            "Fetched live fixtures"
        );

        Ok(payload)
    }
}
