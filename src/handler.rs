//! Invocation entrypoints
//!
//! Each entrypoint turns one trigger event into a `{statusCode, body}`
//! envelope; the body is always a JSON document.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::feed::LiveFeedFetcher;
use crate::pipeline::{GenerationRequest, Orchestrator, PipelineError};

/// Trigger event for insight generation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateEvent {
    /// Restrict the run to one fixture; absent means every fixture
    #[serde(default, alias = "fixture_id")]
    pub fixture_id: Option<String>,
}

/// Response envelope returned by every entrypoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn ok(body: String) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let body = serde_json::json!({ "error": message.into() });
        Self {
            status_code: 500,
            body: body.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

impl From<PipelineError> for InvocationResponse {
    fn from(err: PipelineError) -> Self {
        Self::error(err.to_string())
    }
}

/// Generate insights for the fixtures named by `event`.
///
/// Fixtures whose generation fails are left out of the body; only a failure
/// to read the fixture set produces a 500.
pub async fn generate_insights(
    orchestrator: &Orchestrator,
    event: GenerateEvent,
    cancel: &CancellationToken,
) -> InvocationResponse {
    let request = GenerationRequest::from(event.fixture_id);

    match orchestrator.run(&request, cancel).await {
        Ok(report) => match serde_json::to_string(&report.results) {
            Ok(body) => InvocationResponse::ok(body),
            Err(e) => InvocationResponse::error(e.to_string()),
        },
        Err(e) => {
            error!(scope = %request, error = %e, "Insight run failed");
            e.into()
        }
    }
}

/// Return the upstream live fixtures payload untouched.
pub async fn fetch_match_data(fetcher: &LiveFeedFetcher) -> InvocationResponse {
    match fetcher.fetch_live().await {
        Ok(payload) => InvocationResponse::ok(payload.to_string()),
        Err(e) => {
            let message = format!("{:#}", e);
            error!(error = %message, "Live feed fetch failed");
            InvocationResponse::error(message)
        }
    }
}
