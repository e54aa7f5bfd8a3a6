//! Results persistence.
//!
//! Provides [`JsonlResultsStore`], an append-only JSONL file implementing the
//! [`ResultsStore`](ablation_application::ResultsStore) port.

mod jsonl_store;

pub use jsonl_store::JsonlResultsStore;
