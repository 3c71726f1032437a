use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;

use crate::config::Settings;
use crate::llm::client::{Completion, InsightGenerator};
use crate::MatchdayError;

/// Bedrock runtime `InvokeModel` client authenticated with an API key.
pub struct BedrockClient {
    http: Client,
    api_key: String,
    model_id: String,
    endpoint: String,
}

impl BedrockClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.llm.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(MatchdayError::Config(
                "Bedrock API key is missing. Set llm.api_key in config or MATCHDAY_LLM_API_KEY."
                    .to_string(),
            )
            .into());
        }

        let endpoint = if settings.llm.endpoint.trim().is_empty() {
            format!(
                "https://bedrock-runtime.{}.amazonaws.com",
                settings.llm.region.trim()
            )
        } else {
            settings
                .llm
                .endpoint
                .trim()
                .trim_end_matches('/')
                .to_string()
        };

        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(settings.llm.timeout_secs))
                .build()
                .context("Failed to build Bedrock HTTP client")?,
            api_key,
            model_id: settings.llm.model_id.trim().to_string(),
            endpoint,
        })
    }

    fn request_url(&self) -> String {
        format!("{}/model/{}/invoke", self.endpoint, self.model_id)
    }
}

#[async_trait]
impl InsightGenerator for BedrockClient {
    async fn generate(&self, prompt: &str) -> Result<Completion> {
        let response = self
            .http
            .post(self.request_url())
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&InvokeModelRequest { input: prompt })
            .send()
            .await
            .context("Bedrock request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatchdayError::Generation(format!(
                "Bedrock returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            ))
            .into());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MatchdayError::Generation(format!("Bedrock response is not JSON: {e}")))?;

        let completion = Completion::from_body(body);
        if matches!(completion, Completion::RawBody(_)) {
            tracing::warn!(
                model = %self.model_id,
                "Bedrock response had no completion text, storing raw body"
            );
        }

        Ok(completion)
    }
}

#[derive(Debug, Serialize)]
struct InvokeModelRequest<'a> {
    input: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;

    fn settings_with_key() -> Settings {
        let mut settings = Settings::default();
        settings.llm.api_key = "test-key".to_string();
        settings
    }

    #[test]
    fn builds_regional_invoke_url() {
        let mut settings = settings_with_key();
        settings.llm.region = "eu-west-1".to_string();
        settings.llm.model_id = "anthropic.claude-v2".to_string();

        let client = BedrockClient::from_settings(&settings).unwrap();
        assert_eq!(
            client.request_url(),
            "https://bedrock-runtime.eu-west-1.amazonaws.com/model/anthropic.claude-v2/invoke"
        );
    }

    #[test]
    fn endpoint_override_drops_trailing_slash() {
        let mut settings = settings_with_key();
        settings.llm.endpoint = "http://localhost:4566/".to_string();

        let client = BedrockClient::from_settings(&settings).unwrap();
        assert!(client
            .request_url()
            .starts_with("http://localhost:4566/model/"));
    }

    #[test]
    fn request_body_carries_only_the_prompt() {
        let body = serde_json::to_value(InvokeModelRequest { input: "hello" }).unwrap();
        assert_eq!(body, serde_json::json!({"input": "hello"}));
    }

    fn client_for(endpoint: String) -> BedrockClient {
        let mut settings = settings_with_key();
        settings.llm.endpoint = endpoint;
        settings.llm.model_id = "anthropic.claude-v2".to_string();
        settings.llm.timeout_secs = 5;
        BedrockClient::from_settings(&settings).unwrap()
    }

    #[tokio::test]
    async fn completion_text_is_returned() {
        let (endpoint, request) = serve_once(
            "200 OK",
            "application/json",
            r#"{"completion":" A won 1-0.","stop_reason":"stop_sequence"}"#,
        )
        .await;

        let completion = client_for(endpoint).generate("the prompt").await.unwrap();
        assert_eq!(completion, Completion::Text(" A won 1-0.".to_string()));

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /model/anthropic.claude-v2/invoke "));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer test-key"));
        assert!(request.ends_with(r#"{"input":"the prompt"}"#));
    }

    #[tokio::test]
    async fn body_without_completion_is_kept_raw() {
        let (endpoint, _request) = serve_once(
            "200 OK",
            "application/json",
            r#"{"outputText":"A won."}"#,
        )
        .await;

        let completion = client_for(endpoint).generate("prompt").await.unwrap();
        assert_eq!(
            completion,
            Completion::RawBody(serde_json::json!({"outputText": "A won."}))
        );
    }

    #[tokio::test]
    async fn error_status_is_a_generation_error() {
        let (endpoint, _request) = serve_once(
            "500 Internal Server Error",
            "application/json",
            r#"{"message":"ThrottlingException"}"#,
        )
        .await;

        let err = client_for(endpoint).generate("prompt").await.unwrap_err();
        let message = err.to_string();
        assert!(matches!(
            err.downcast_ref::<MatchdayError>(),
            Some(MatchdayError::Generation(_))
        ));
        assert!(message.contains("500"));
        assert!(message.contains("ThrottlingException"));
    }

    #[tokio::test]
    async fn non_json_body_is_a_generation_error() {
        let (endpoint, _request) = serve_once("200 OK", "text/plain", "service unavailable").await;

        let err = client_for(endpoint).generate("prompt").await.unwrap_err();
        assert!(err.to_string().contains("Bedrock response is not JSON"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_error() {
        let mut settings = settings_with_key();
        settings.llm.endpoint = "http://127.0.0.1:9".to_string();
        settings.llm.timeout_secs = 2;

        let client = BedrockClient::from_settings(&settings).unwrap();
        let err = client.generate("prompt").await.unwrap_err();
        assert!(err.to_string().contains("Bedrock request failed"));
    }
}
