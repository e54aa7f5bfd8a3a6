//! Results store port
//!
//! Append-only persistence of graded trials. The set of stored request ids
//! is what makes an interrupted run resumable.

use ablation_domain::ExperimentRecord;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record at line {line}: {message}")]
    Corrupt { line: usize, message: String },

    #[error("No results at {}", .0.display())]
    NotFound(PathBuf),
}

/// Port for persisting experiment records.
///
/// Methods are synchronous: every call is a short buffered write or a
/// one-off read, and implementations guard their writer with a mutex so a
/// single store can be shared across runner tasks.
pub trait ResultsStore: Send + Sync {
    /// Request ids already recorded.
    fn completed_request_ids(&self) -> Result<HashSet<String>, StoreError>;

    /// Append one record.
    fn append(&self, record: &ExperimentRecord) -> Result<(), StoreError>;

    /// Every stored record, in write order.
    fn load_all(&self) -> Result<Vec<ExperimentRecord>, StoreError>;

    /// Push buffered records to durable storage.
    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
