use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::Settings;
use crate::llm::bedrock::BedrockClient;

/// What the backend handed back, decided once when the response is parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The backend's `completion` text
    Text(String),
    /// Response without usable completion text, kept verbatim
    RawBody(Value),
}

impl Completion {
    /// Classify a decoded response body.
    pub fn from_body(body: Value) -> Self {
        match body.get("completion").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => Self::Text(text.to_string()),
            _ => Self::RawBody(body),
        }
    }

    /// Text to store as the fixture insight.
    ///
    /// A raw body is stored as its compact JSON serialization.
    pub fn into_insight(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::RawBody(body) => body.to_string(),
        }
    }
}

#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Completion>;
}

/// Build the insight generator from runtime settings.
pub fn build_generator(settings: &Settings) -> Result<BedrockClient> {
    BedrockClient::from_settings(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completion_field_becomes_text() {
        let completion = Completion::from_body(json!({
            "completion": "Arsenal held on for a 2-1 win.",
            "stop_reason": "stop_sequence"
        }));

        assert_eq!(
            completion,
            Completion::Text("Arsenal held on for a 2-1 win.".to_string())
        );
    }

    #[test]
    fn missing_completion_keeps_raw_body() {
        let body = json!({"results": [{"outputText": "A won."}]});
        let completion = Completion::from_body(body.clone());

        assert_eq!(completion, Completion::RawBody(body));
        assert_eq!(
            completion.into_insight(),
            r#"{"results":[{"outputText":"A won."}]}"#
        );
    }

    #[test]
    fn empty_or_non_string_completion_is_raw_body() {
        assert!(matches!(
            Completion::from_body(json!({"completion": ""})),
            Completion::RawBody(_)
        ));
        assert!(matches!(
            Completion::from_body(json!({"completion": 42})),
            Completion::RawBody(_)
        ));
    }

    #[test]
    fn generator_requires_api_key() {
        let settings = Settings::default();

        let err = match build_generator(&settings) {
            Ok(_) => panic!("expected generator creation to fail"),
            Err(e) => e.to_string(),
        };
        assert!(err.contains("Bedrock API key is missing"));
    }
}
