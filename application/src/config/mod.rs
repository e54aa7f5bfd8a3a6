//! Application-level configuration.
//!
//! - [`ExperimentParams`]: prompt construction and analysis scope
//! - [`RunnerParams`]: request loop control (concurrency, retries, timeouts)

pub mod experiment_params;
pub mod runner_params;

pub use experiment_params::{DEFAULT_BASE_TEMPLATE, ExperimentParams};
pub use runner_params::RunnerParams;
