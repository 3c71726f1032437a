//! Insight run orchestration

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::llm::{build_fixture_prompt, InsightGenerator};
use crate::pipeline::{
    Clock, FixtureFailure, FixtureLocks, GenerationRequest, InsightResult, PipelineError,
    RunReport, SystemClock,
};
use crate::storage::FixtureStore;

const DEFAULT_CONCURRENCY: usize = 4;

enum FixtureOutcome {
    Done(InsightResult),
    Failed(FixtureFailure),
    Missing,
    Skipped,
    Aborted(PipelineError),
}

/// Drives prompt building, generation and persistence for a set of fixtures.
pub struct Orchestrator {
    store: Arc<dyn FixtureStore>,
    generator: Arc<dyn InsightGenerator>,
    clock: Arc<dyn Clock>,
    locks: Arc<FixtureLocks>,
    concurrency: usize,
}

impl Orchestrator {
    /// Create an orchestrator using the wall clock and the default worker count
    pub fn new(store: Arc<dyn FixtureStore>, generator: Arc<dyn InsightGenerator>) -> Self {
        Self {
            store,
            generator,
            clock: Arc::new(SystemClock),
            locks: Arc::new(FixtureLocks::new()),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Create an orchestrator sized by the pipeline settings
    pub fn from_settings(
        settings: &Settings,
        store: Arc<dyn FixtureStore>,
        generator: Arc<dyn InsightGenerator>,
    ) -> Self {
        Self::new(store, generator).with_concurrency(settings.pipeline.concurrency)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Cap on fixtures processed (and backend calls in flight) at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Run the pipeline over the fixtures selected by `request`.
    ///
    /// Per-fixture failures are reported in the returned [`RunReport`]; only a
    /// failure to read fixtures is returned as an error. Once `cancel` fires no
    /// new fixture is started, while fixtures already in flight finish and
    /// keep their writes.
    pub async fn run(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<RunReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let targets = self.select(request)?;
        let total = targets.len();

        info!(
            run_id = %run_id,
            scope = %request,
            fixtures = total,
            workers = self.concurrency,
            "Starting insight run"
        );

        let outcomes: Vec<FixtureOutcome> = stream::iter(targets)
            .map(|fixture_id| {
                let cancel = cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        debug!(run_id = %run_id, fixture = %fixture_id, "Run cancelled, not starting fixture");
                        return FixtureOutcome::Skipped;
                    }

                    match self.process(&fixture_id).await {
                        Ok(Some(insight)) => {
                            debug!(run_id = %run_id, fixture = %fixture_id, "Insight stored");
                            FixtureOutcome::Done(InsightResult {
                                fixture_id,
                                insight,
                            })
                        }
                        Ok(None) => {
                            info!(run_id = %run_id, fixture = %fixture_id, "Fixture not in cache, nothing to generate");
                            FixtureOutcome::Missing
                        }
                        Err(e) if e.is_fatal() => FixtureOutcome::Aborted(e),
                        Err(e) => {
                            error!(run_id = %run_id, fixture = %fixture_id, error = %e, "Fixture skipped");
                            FixtureOutcome::Failed(FixtureFailure {
                                fixture_id,
                                reason: e.to_string(),
                            })
                        }
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = RunReport {
            run_id,
            results: Vec::with_capacity(total),
            failures: Vec::new(),
            skipped: 0,
        };

        for outcome in outcomes {
            match outcome {
                FixtureOutcome::Done(result) => report.results.push(result),
                FixtureOutcome::Failed(failure) => report.failures.push(failure),
                FixtureOutcome::Missing => {}
                FixtureOutcome::Skipped => report.skipped += 1,
                FixtureOutcome::Aborted(e) => {
                    error!(run_id = %run_id, error = %e, "Insight run aborted");
                    return Err(e);
                }
            }
        }

        if report.skipped > 0 {
            warn!(
                run_id = %run_id,
                skipped = report.skipped,
                "Insight run cancelled before all fixtures started"
            );
        }

        info!(
            run_id = %run_id,
            total,
            succeeded = report.results.len(),
            failed = report.failures.len(),
            "Insight run complete"
        );

        Ok(report)
    }

    /// Fixture IDs covered by `request`, ascending
    fn select(&self, request: &GenerationRequest) -> Result<Vec<String>, PipelineError> {
        match request {
            GenerationRequest::Fixture(id) => Ok(vec![id.clone()]),
            GenerationRequest::All => {
                let mut ids: Vec<String> = self
                    .store
                    .scan_all()
                    .map_err(PipelineError::StoreRead)?
                    .into_iter()
                    .map(|record| record.fixture_id)
                    .collect();
                ids.sort();
                Ok(ids)
            }
        }
    }

    /// Read, generate and persist the insight for one fixture.
    ///
    /// The record is read under the fixture lock so the prompt always reflects
    /// the latest committed write. Returns `None` when the fixture is absent.
    async fn process(&self, fixture_id: &str) -> Result<Option<String>, PipelineError> {
        let _guard = self.locks.lock(fixture_id).await;

        let Some(record) = self
            .store
            .get(fixture_id)
            .map_err(PipelineError::StoreRead)?
        else {
            return Ok(None);
        };

        let prompt = build_fixture_prompt(&record);
        let insight = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|cause| PipelineError::Generation {
                fixture_id: fixture_id.to_string(),
                cause,
            })?
            .into_insight();

        self.store
            .update_insight(fixture_id, &insight, self.clock.now())
            .map_err(|cause| PipelineError::Store {
                fixture_id: fixture_id.to_string(),
                cause,
            })?;

        Ok(Some(insight))
    }
}
