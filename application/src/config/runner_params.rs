//! Runner parameters: request loop control.
//!
//! [`RunnerParams`] groups the static parameters that control how
//! [`RunExperimentUseCase`](crate::use_cases::run_experiment::RunExperimentUseCase)
//! drives the gateway. These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on a single backoff delay.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Request loop control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerParams {
    /// Maximum requests in flight at once (at least 1).
    pub concurrency: usize,
    /// Extra attempts for retryable gateway errors.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each later one.
    pub retry_backoff: Duration,
    /// Per-attempt timeout.
    pub timeout: Option<Duration>,
}

impl Default for RunnerParams {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl RunnerParams {
    // ==================== Builder Methods ====================

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay before retry number `attempt` (0-based): `backoff * 2^attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.retry_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}
