//! Run Experiment use case
//!
//! Sends every planned request to the gateway, grades the response and
//! appends the record to the results store. Requests already in the store
//! are skipped, so an interrupted run picks up where it stopped.

use crate::config::RunnerParams;
use crate::ports::llm_gateway::{CompletionRequest, GatewayError, LlmGateway};
use crate::ports::progress::{ExperimentProgress, NoProgress, TrialStatus};
use crate::ports::results_store::{ResultsStore, StoreError};
use crate::use_cases::plan_experiment::PlannedRequest;
use ablation_domain::core::string::preview;
use ablation_domain::{ExperimentRecord, extract_answer, grade_answer};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that abort a run
#[derive(Error, Debug)]
pub enum RunExperimentError {
    #[error("Results store error: {0}")]
    Store(#[from] StoreError),

    #[error("Concurrency limiter closed")]
    LimiterClosed,
}

/// Counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExperimentSummary {
    pub planned: usize,
    /// Already in the store before this run
    pub skipped: usize,
    pub completed: usize,
    pub failed: usize,
    pub correct: usize,
    /// `correct / completed` (0 when nothing completed)
    pub accuracy: f64,
    pub cancelled: bool,
}

impl ExperimentSummary {
    fn finish(mut self) -> Self {
        self.accuracy = if self.completed == 0 {
            0.0
        } else {
            self.correct as f64 / self.completed as f64
        };
        self
    }
}

/// Input for the RunExperiment use case
#[derive(Debug, Clone)]
pub struct RunExperimentInput {
    pub requests: Vec<PlannedRequest>,
    /// Model name recorded with each result
    pub model: String,
}

impl RunExperimentInput {
    pub fn new(requests: Vec<PlannedRequest>, model: impl Into<String>) -> Self {
        Self {
            requests,
            model: model.into(),
        }
    }
}

enum TrialOutcome {
    Graded { request_id: String, correct: bool },
    Failed { request_id: String, error: GatewayError },
}

/// Use case for executing an experiment plan
pub struct RunExperimentUseCase<G: LlmGateway + 'static, S: ResultsStore + 'static> {
    gateway: Arc<G>,
    store: Arc<S>,
    params: RunnerParams,
    cancellation_token: Option<CancellationToken>,
}

impl<G: LlmGateway + 'static, S: ResultsStore + 'static> RunExperimentUseCase<G, S> {
    pub fn new(gateway: Arc<G>, store: Arc<S>) -> Self {
        Self {
            gateway,
            store,
            params: RunnerParams::default(),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: RunnerParams) -> Self {
        self.params = params;
        self
    }

    /// Stop issuing new requests once the token is cancelled.
    ///
    /// Requests already in flight are still awaited and recorded.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunExperimentInput,
    ) -> Result<ExperimentSummary, RunExperimentError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunExperimentInput,
        progress: &dyn ExperimentProgress,
    ) -> Result<ExperimentSummary, RunExperimentError> {
        let done = self.store.completed_request_ids()?;
        let planned = input.requests.len();
        let pending: Vec<PlannedRequest> = input
            .requests
            .into_iter()
            .filter(|r| !done.contains(&r.request_id))
            .collect();

        let mut summary = ExperimentSummary {
            planned,
            skipped: planned - pending.len(),
            ..Default::default()
        };

        info!(
            "Running {} requests via {} ({} already recorded, concurrency {})",
            pending.len(),
            self.gateway.name(),
            summary.skipped,
            self.params.concurrency
        );
        progress.on_run_start(pending.len(), summary.skipped);

        let semaphore = Arc::new(Semaphore::new(self.params.concurrency.max(1)));
        let model: Arc<str> = Arc::from(input.model);
        let mut join_set = JoinSet::new();
        let mut first_error: Option<RunExperimentError> = None;

        for request in pending {
            if self.should_stop(&mut summary, &first_error) {
                break;
            }

            // Wait for a free slot, handling finished trials meanwhile.
            let permit = loop {
                tokio::select! {
                    permit = Arc::clone(&semaphore).acquire_owned() => {
                        break permit.map_err(|_| RunExperimentError::LimiterClosed)?;
                    }
                    Some(joined) = join_set.join_next(), if !join_set.is_empty() => {
                        Self::tally(joined, &mut summary, &mut first_error, progress);
                    }
                }
            };
            // Cancellation or a store failure may have arrived while waiting.
            if self.should_stop(&mut summary, &first_error) {
                drop(permit);
                break;
            }

            let gateway = Arc::clone(&self.gateway);
            let store = Arc::clone(&self.store);
            let params = self.params.clone();
            let model = Arc::clone(&model);

            join_set.spawn(async move {
                let outcome = Self::run_trial(&gateway, &store, &params, &model, request).await;
                drop(permit);
                outcome
            });
        }

        while let Some(joined) = join_set.join_next().await {
            Self::tally(joined, &mut summary, &mut first_error, progress);
        }

        self.store.flush()?;
        if let Some(error) = first_error {
            return Err(error);
        }

        let summary = summary.finish();
        info!(
            "Run finished: {} completed, {} failed, {} skipped, accuracy {:.3}",
            summary.completed, summary.failed, summary.skipped, summary.accuracy
        );
        progress.on_run_complete(&summary);
        Ok(summary)
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn should_stop(
        &self,
        summary: &mut ExperimentSummary,
        first_error: &Option<RunExperimentError>,
    ) -> bool {
        if self.is_cancelled() {
            warn!("Cancellation requested; not sending remaining requests");
            summary.cancelled = true;
            return true;
        }
        first_error.is_some()
    }

    fn tally(
        joined: Result<Result<TrialOutcome, StoreError>, JoinError>,
        summary: &mut ExperimentSummary,
        first_error: &mut Option<RunExperimentError>,
        progress: &dyn ExperimentProgress,
    ) {
        match joined {
            Ok(Ok(TrialOutcome::Graded {
                request_id,
                correct,
            })) => {
                summary.completed += 1;
                summary.correct += usize::from(correct);
                let status = if correct {
                    TrialStatus::Correct
                } else {
                    TrialStatus::Incorrect
                };
                progress.on_request_complete(&request_id, status);
            }
            Ok(Ok(TrialOutcome::Failed { request_id, error })) => {
                warn!("Request {} failed: {}", request_id, error);
                summary.failed += 1;
                progress.on_request_complete(&request_id, TrialStatus::Failed);
            }
            Ok(Err(error)) => {
                warn!("Failed to store result: {}", error);
                if first_error.is_none() {
                    *first_error = Some(RunExperimentError::Store(error));
                }
            }
            Err(e) => {
                warn!("Task join error: {}", e);
                summary.failed += 1;
            }
        }
    }

    /// Send, grade and store one request.
    async fn run_trial(
        gateway: &G,
        store: &S,
        params: &RunnerParams,
        model: &str,
        request: PlannedRequest,
    ) -> Result<TrialOutcome, StoreError> {
        let completion = CompletionRequest {
            request_id: request.request_id.clone(),
            problem_id: request.problem_id.clone(),
            prompt: request.prompt,
        };
        debug!(
            "Sending {}: {}",
            completion.request_id,
            preview(&completion.prompt, 80)
        );

        let response = match Self::complete_with_retry(gateway, params, &completion).await {
            Ok(response) => response,
            Err(error) => {
                return Ok(TrialOutcome::Failed {
                    request_id: request.request_id,
                    error,
                });
            }
        };

        let answer = extract_answer(&response);
        let correct = grade_answer(&answer, &request.expected_answer);
        debug!(
            "{} answered '{}' (expected '{}'): {}",
            request.request_id, answer, request.expected_answer, correct
        );

        let record = ExperimentRecord {
            request_id: request.request_id.clone(),
            problem_id: request.problem_id,
            combination_index: request.combination_index,
            combination: request.combination,
            response_answer: answer,
            expected_answer: request.expected_answer,
            correct,
            model: model.to_string(),
            recorded_at: chrono::Utc::now().to_rfc3339(),
        };
        store.append(&record)?;

        Ok(TrialOutcome::Graded {
            request_id: request.request_id,
            correct,
        })
    }

    async fn complete_with_retry(
        gateway: &G,
        params: &RunnerParams,
        request: &CompletionRequest,
    ) -> Result<String, GatewayError> {
        let mut attempt = 0;
        loop {
            let result = match params.timeout {
                Some(limit) => tokio::time::timeout(limit, gateway.complete(request))
                    .await
                    .unwrap_or(Err(GatewayError::Timeout)),
                None => gateway.complete(request).await,
            };

            match result {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < params.max_retries => {
                    let delay = params.backoff_for(attempt);
                    warn!(
                        "Request {} attempt {} failed ({}); retrying in {:?}",
                        request.request_id,
                        attempt + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::analyze_results::{AnalyzeResultsInput, AnalyzeResultsUseCase};
    use crate::use_cases::plan_experiment::{PlanExperimentInput, PlanExperimentUseCase};
    use crate::config::ExperimentParams;
    use ablation_domain::{ComponentSet, Problem, PromptComponent};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Answers correctly only when the prompt contains "Verify.".
    struct ScriptedGateway {
        answers: HashMap<String, String>,
        failures: Mutex<HashMap<String, Vec<GatewayError>>>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedGateway {
        fn new(problems: &[Problem]) -> Self {
            Self {
                answers: problems
                    .iter()
                    .map(|p| (p.unique_id.clone(), p.answer.clone()))
                    .collect(),
                failures: Mutex::new(HashMap::new()),
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn fail_first(self, request_id: &str, errors: Vec<GatewayError>) -> Self {
            self.failures
                .lock()
                .unwrap()
                .insert(request_id.to_string(), errors);
            self
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let scripted = {
                let mut failures = self.failures.lock().unwrap();
                failures
                    .get_mut(&request.request_id)
                    .and_then(|errs| (!errs.is_empty()).then(|| errs.remove(0)))
            };
            if let Some(error) = scripted {
                return Err(error);
            }

            let answer = &self.answers[&request.problem_id];
            if request.prompt.contains("Verify.") {
                Ok(format!("work <answer>{}</answer>", answer))
            } else {
                Ok("I am not sure".to_string())
            }
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<ExperimentRecord>>,
    }

    impl ResultsStore for MemoryStore {
        fn completed_request_ids(&self) -> Result<HashSet<String>, StoreError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.request_id.clone())
                .collect())
        }

        fn append(&self, record: &ExperimentRecord) -> Result<(), StoreError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        fn load_all(&self) -> Result<Vec<ExperimentRecord>, StoreError> {
            Ok(self.records.lock().unwrap().clone())
        }
    }

    struct CountingProgress {
        started: Mutex<Option<(usize, usize)>>,
        completed: AtomicUsize,
    }

    impl ExperimentProgress for CountingProgress {
        fn on_run_start(&self, pending: usize, skipped: usize) {
            *self.started.lock().unwrap() = Some((pending, skipped));
        }

        fn on_request_complete(&self, _request_id: &str, _status: TrialStatus) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn problems() -> Vec<Problem> {
        vec![
            Problem::new("test/algebra/1.json", "2+2?", "4"),
            Problem::new("test/algebra/2.json", "3+3?", "6"),
            Problem::new("test/algebra/3.json", "half of one?", "\\frac{1}{2}"),
        ]
    }

    fn plan() -> Vec<PlannedRequest> {
        let set = ComponentSet::from_components([
            PromptComponent::prefix("Role", "Expert."),
            PromptComponent::suffix("Verify", "Verify."),
        ])
        .unwrap();
        let input = PlanExperimentInput::new(set, problems())
            .with_params(ExperimentParams::default().with_base_template("{problem}"));
        PlanExperimentUseCase::execute(&input).unwrap().requests
    }

    fn fast_params() -> RunnerParams {
        RunnerParams::default()
            .with_concurrency(3)
            .with_retry_backoff(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_run_grades_and_stores_every_request() {
        let gateway = Arc::new(ScriptedGateway::new(&problems()));
        let store = Arc::new(MemoryStore::default());
        let use_case = RunExperimentUseCase::new(Arc::clone(&gateway), Arc::clone(&store))
            .with_params(fast_params());

        let summary = use_case
            .execute(RunExperimentInput::new(plan(), "mock-model"))
            .await
            .unwrap();

        assert_eq!(summary.planned, 12);
        assert_eq!(summary.completed, 12);
        assert_eq!(summary.failed, 0);
        // Only the two Verify combinations (indices 2 and 3) answer correctly
        assert_eq!(summary.correct, 6);
        assert!((summary.accuracy - 0.5).abs() < 1e-12);

        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 12);
        let record = records.iter().find(|r| r.request_id == "3_test_algebra_3").unwrap();
        assert!(record.correct);
        assert_eq!(record.response_answer, "\\frac{1}{2}");
        assert_eq!(record.model, "mock-model");
        assert!(!record.recorded_at.is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let gateway = Arc::new(ScriptedGateway::new(&problems()));
        let store = Arc::new(MemoryStore::default());
        let use_case = RunExperimentUseCase::new(Arc::clone(&gateway), store)
            .with_params(fast_params().with_concurrency(2));

        use_case
            .execute(RunExperimentInput::new(plan(), "m"))
            .await
            .unwrap();

        assert!(gateway.max_in_flight.load(Ordering::SeqCst) <= 2);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn test_resume_skips_recorded_requests() {
        let gateway = Arc::new(ScriptedGateway::new(&problems()));
        let store = Arc::new(MemoryStore::default());
        let use_case = RunExperimentUseCase::new(Arc::clone(&gateway), Arc::clone(&store))
            .with_params(fast_params());

        let first: Vec<_> = plan().into_iter().take(5).collect();
        use_case
            .execute(RunExperimentInput::new(first, "m"))
            .await
            .unwrap();

        let progress = CountingProgress {
            started: Mutex::new(None),
            completed: AtomicUsize::new(0),
        };
        let summary = use_case
            .execute_with_progress(RunExperimentInput::new(plan(), "m"), &progress)
            .await
            .unwrap();

        assert_eq!(summary.skipped, 5);
        assert_eq!(summary.completed, 7);
        assert_eq!(*progress.started.lock().unwrap(), Some((7, 5)));
        assert_eq!(progress.completed.load(Ordering::SeqCst), 7);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 12);
        assert_eq!(store.load_all().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_retryable_errors_are_retried() {
        let gateway = Arc::new(ScriptedGateway::new(&problems()).fail_first(
            "2_test_algebra_1",
            vec![GatewayError::Timeout, GatewayError::RateLimited("429".into())],
        ));
        let store = Arc::new(MemoryStore::default());
        let use_case = RunExperimentUseCase::new(Arc::clone(&gateway), Arc::clone(&store))
            .with_params(fast_params());

        let summary = use_case
            .execute(RunExperimentInput::new(plan(), "m"))
            .await
            .unwrap();

        assert_eq!(summary.completed, 12);
        assert_eq!(summary.failed, 0);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 14);
    }

    #[tokio::test]
    async fn test_non_retryable_and_exhausted_errors_fail_request() {
        let gateway = Arc::new(
            ScriptedGateway::new(&problems())
                .fail_first(
                    "0_test_algebra_1",
                    vec![GatewayError::RequestFailed("400".into())],
                )
                .fail_first(
                    "1_test_algebra_2",
                    vec![
                        GatewayError::Timeout,
                        GatewayError::Timeout,
                        GatewayError::Timeout,
                    ],
                ),
        );
        let store = Arc::new(MemoryStore::default());
        let use_case = RunExperimentUseCase::new(Arc::clone(&gateway), Arc::clone(&store))
            .with_params(fast_params().with_max_retries(2));

        let summary = use_case
            .execute(RunExperimentInput::new(plan(), "m"))
            .await
            .unwrap();

        assert_eq!(summary.failed, 2);
        assert_eq!(summary.completed, 10);
        let ids: HashSet<_> = store.completed_request_ids().unwrap();
        assert!(!ids.contains("0_test_algebra_1"));
        assert!(!ids.contains("1_test_algebra_2"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_sends_nothing() {
        let gateway = Arc::new(ScriptedGateway::new(&problems()));
        let store = Arc::new(MemoryStore::default());
        let token = CancellationToken::new();
        token.cancel();
        let use_case = RunExperimentUseCase::new(Arc::clone(&gateway), store)
            .with_params(fast_params())
            .with_cancellation(token);

        let summary = use_case
            .execute(RunExperimentInput::new(plan(), "m"))
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.completed, 0);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_slot_sends_nothing_more() {
        /// Cancels the run from inside the first call.
        struct CancellingGateway {
            token: CancellationToken,
            calls: AtomicUsize,
        }

        #[async_trait]
        impl LlmGateway for CancellingGateway {
            fn name(&self) -> &str {
                "cancelling"
            }

            async fn complete(&self, _request: &CompletionRequest) -> Result<String, GatewayError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.token.cancel();
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok("<answer>4</answer>".to_string())
            }
        }

        let token = CancellationToken::new();
        let gateway = Arc::new(CancellingGateway {
            token: token.clone(),
            calls: AtomicUsize::new(0),
        });
        let store = Arc::new(MemoryStore::default());
        let use_case = RunExperimentUseCase::new(Arc::clone(&gateway), Arc::clone(&store))
            .with_params(fast_params().with_concurrency(1))
            .with_cancellation(token);

        let summary = use_case
            .execute(RunExperimentInput::new(plan(), "m"))
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.completed, 1);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_number_across_subjects_all_reach_analysis() {
        let problems = vec![
            Problem::new("test/algebra/7.json", "2+2?", "4"),
            Problem::new("test/geometry/7.json", "Sides of a square?", "4"),
        ];
        let set = ComponentSet::from_components([
            PromptComponent::prefix("Role", "Expert."),
            PromptComponent::suffix("Verify", "Verify."),
        ])
        .unwrap();
        let input = PlanExperimentInput::new(set.clone(), problems.clone())
            .with_params(ExperimentParams::default().with_base_template("{problem}"));
        let requests = PlanExperimentUseCase::execute(&input).unwrap().requests;

        let gateway = Arc::new(ScriptedGateway::new(&problems));
        let store = Arc::new(MemoryStore::default());
        let use_case = RunExperimentUseCase::new(Arc::clone(&gateway), Arc::clone(&store))
            .with_params(fast_params());
        let summary = use_case
            .execute(RunExperimentInput::new(requests.clone(), "m"))
            .await
            .unwrap();
        assert_eq!(summary.completed, 8);

        // A second run finds every trial recorded
        let rerun = use_case
            .execute(RunExperimentInput::new(requests, "m"))
            .await
            .unwrap();
        assert_eq!(rerun.skipped, 8);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 8);

        let report = AnalyzeResultsUseCase::new(store)
            .execute(&AnalyzeResultsInput {
                components: set,
                max_interaction_order: None,
                anova: None,
            })
            .unwrap();
        assert_eq!(report.matrix.rows().len(), 8);
        assert_eq!(report.summary.trials, 8);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        struct SlowGateway;

        #[async_trait]
        impl LlmGateway for SlowGateway {
            fn name(&self) -> &str {
                "slow"
            }

            async fn complete(&self, _request: &CompletionRequest) -> Result<String, GatewayError> {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(String::new())
            }
        }

        let store = Arc::new(MemoryStore::default());
        let use_case = RunExperimentUseCase::new(Arc::new(SlowGateway), store).with_params(
            fast_params()
                .with_max_retries(0)
                .with_timeout(Some(Duration::from_millis(10))),
        );

        let requests: Vec<_> = plan().into_iter().take(2).collect();
        let summary = use_case
            .execute(RunExperimentInput::new(requests, "m"))
            .await
            .unwrap();
        assert_eq!(summary.failed, 2);
    }
}
