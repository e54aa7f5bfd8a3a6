//! Runner configuration from TOML (`[runner]` section)

use ablation_application::RunnerParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw runner configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRunnerConfig {
    pub concurrency: usize,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// 0 disables the per-request timeout
    pub timeout_secs: u64,
}

impl Default for FileRunnerConfig {
    fn default() -> Self {
        let params = RunnerParams::default();
        Self {
            concurrency: params.concurrency,
            max_retries: params.max_retries,
            retry_backoff_ms: u64::try_from(params.retry_backoff.as_millis()).unwrap_or(500),
            timeout_secs: params.timeout.map_or(0, |t| t.as_secs()),
        }
    }
}

impl FileRunnerConfig {
    pub fn to_params(&self) -> RunnerParams {
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        RunnerParams::default()
            .with_concurrency(self.concurrency)
            .with_max_retries(self.max_retries)
            .with_retry_backoff(Duration::from_millis(self.retry_backoff_ms))
            .with_timeout(timeout)
    }
}
