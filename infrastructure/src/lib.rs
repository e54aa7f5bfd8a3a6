//! Infrastructure layer for prompt-ablation
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: configuration loading, dataset readers, the JSONL
//! results store, the mock gateway and analysis file export.

pub mod config;
pub mod dataset;
pub mod export;
pub mod providers;
pub mod store;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig};
pub use dataset::{DatasetError, load_examples, load_problems};
pub use export::{write_design_matrix, write_json};
pub use providers::MockLlmGateway;
pub use store::JsonlResultsStore;
