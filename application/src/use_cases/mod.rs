//! Use cases (application services)

pub mod analyze_results;
pub mod plan_experiment;
pub mod run_experiment;
