//! Application layer for prompt-ablation
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ExperimentParams, RunnerParams};
pub use ports::{
    llm_gateway::{CompletionRequest, GatewayError, LlmGateway},
    progress::{ExperimentProgress, NoProgress, TrialStatus},
    results_store::{ResultsStore, StoreError},
};
pub use use_cases::analyze_results::{
    AnalysisReport, AnalyzeResultsError, AnalyzeResultsInput, AnalyzeResultsUseCase,
};
pub use use_cases::plan_experiment::{
    ExperimentPlan, PlanExperimentError, PlanExperimentInput, PlanExperimentUseCase,
    PlannedRequest,
};
pub use use_cases::run_experiment::{
    ExperimentSummary, RunExperimentError, RunExperimentInput, RunExperimentUseCase,
};
