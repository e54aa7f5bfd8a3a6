//! Analyze Results use case
//!
//! Loads stored records for the current component set and prepares the
//! inputs of the external regression: design matrix, formula, descriptive
//! accuracy and (given an ANOVA table) effect sizes.

use crate::ports::results_store::{ResultsStore, StoreError};
use ablation_domain::analysis::RESPONSE_COLUMN;
use ablation_domain::{
    AccuracySummary, AnovaTerm, ComponentSet, DesignMatrix, DomainError, ExperimentRecord,
    TermEffect, effect_sizes, formula,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum AnalyzeResultsError {
    #[error("No results recorded yet")]
    NoResults,

    #[error("ANOVA table has no Residual row")]
    MissingResidual,

    #[error("Results store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Clone)]
pub struct AnalyzeResultsInput {
    pub components: ComponentSet,
    /// `None` exports the full factorial
    pub max_interaction_order: Option<usize>,
    /// Externally fitted ANOVA table, if available
    pub anova: Option<Vec<AnovaTerm>>,
}

/// Everything the external analysis engine needs, plus descriptive results.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub formula: String,
    pub matrix: DesignMatrix,
    pub summary: AccuracySummary,
    pub effects: Option<Vec<TermEffect>>,
}

pub struct AnalyzeResultsUseCase<S: ResultsStore> {
    store: Arc<S>,
}

impl<S: ResultsStore> AnalyzeResultsUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn execute(&self, input: &AnalyzeResultsInput) -> Result<AnalysisReport, AnalyzeResultsError> {
        let records = dedupe(self.store.load_all()?);
        if records.is_empty() {
            return Err(AnalyzeResultsError::NoResults);
        }
        info!("Analyzing {} records", records.len());

        let matrix =
            DesignMatrix::from_records(&input.components, &records, input.max_interaction_order)?;
        let summary = AccuracySummary::from_records(&input.components, &records)?;

        let effects = match &input.anova {
            Some(table) => Some(effect_sizes(table).ok_or(AnalyzeResultsError::MissingResidual)?),
            None => None,
        };

        Ok(AnalysisReport {
            formula: formula(RESPONSE_COLUMN, &input.components),
            matrix,
            summary,
            effects,
        })
    }
}

/// Keep the last record per request id, in first-seen order.
fn dedupe(records: Vec<ExperimentRecord>) -> Vec<ExperimentRecord> {
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<ExperimentRecord> = Vec::with_capacity(records.len());
    for record in records {
        match position.get(&record.request_id) {
            Some(&i) => {
                warn!("Duplicate record for {}; keeping the latest", record.request_id);
                out[i] = record;
            }
            None => {
                position.insert(record.request_id.clone(), out.len());
                out.push(record);
            }
        }
    }
    out
}
