//! Progress notification port
//!
//! Defines the interface for reporting progress during an experiment run.

use crate::use_cases::run_experiment::ExperimentSummary;

/// Result of one planned request, as seen by progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialStatus {
    Correct,
    Incorrect,
    Failed,
}

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer.
pub trait ExperimentProgress: Send + Sync {
    /// Called once before any request is sent
    fn on_run_start(&self, pending: usize, skipped: usize);

    /// Called when a request finishes (after retries)
    fn on_request_complete(&self, request_id: &str, status: TrialStatus);

    /// Called after the last in-flight request is drained
    fn on_run_complete(&self, _summary: &ExperimentSummary) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ExperimentProgress for NoProgress {
    fn on_run_start(&self, _pending: usize, _skipped: usize) {}
    fn on_request_complete(&self, _request_id: &str, _status: TrialStatus) {}
}
