//! Full-factorial design matrix

use crate::combination::Combination;
use crate::component::ComponentSet;
use crate::core::error::DomainError;
use crate::core::string::sanitize_column_name;
use crate::experiment::ExperimentRecord;
use serde_json::{Map, Value};

/// Name of the binary response column.
pub const RESPONSE_COLUMN: &str = "correct";

/// Regression formula over every component with all interactions.
///
/// `correct ~ A * B * C`, or `correct ~ 1` when there are no components.
pub fn formula(response: &str, set: &ComponentSet) -> String {
    if set.is_empty() {
        return format!("{} ~ 1", response);
    }
    let terms: Vec<String> = set.names().map(sanitize_column_name).collect();
    format!("{} ~ {}", response, terms.join(" * "))
}

/// One observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignRow {
    pub request_id: String,
    pub problem_id: String,
    pub combination_index: u64,
    /// One 0/1 value per column of the matrix
    pub values: Vec<u8>,
    pub correct: bool,
}

/// Indicator and interaction columns for a set of records.
///
/// Columns are the component indicators in set order, followed by one
/// product column per component subset of size 2 up to `max_order`,
/// grouped by size and in lexicographic index order within a size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignMatrix {
    columns: Vec<String>,
    terms: Vec<Vec<usize>>,
    rows: Vec<DesignRow>,
}

impl DesignMatrix {
    /// Build the matrix. `max_order = None` means the full factorial.
    pub fn from_records(
        set: &ComponentSet,
        records: &[ExperimentRecord],
        max_order: Option<usize>,
    ) -> Result<Self, DomainError> {
        let n = set.len();
        let max_order = max_order.unwrap_or(n).min(n);

        let names: Vec<String> = set.names().map(sanitize_column_name).collect();
        let mut terms: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
        for order in 2..=max_order {
            terms.extend(index_subsets(n, order));
        }
        let columns = terms
            .iter()
            .map(|term| {
                term.iter()
                    .map(|&i| names[i].as_str())
                    .collect::<Vec<_>>()
                    .join(":")
            })
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                let flags = record.flags(set)?;
                let values = terms
                    .iter()
                    .map(|term| u8::from(term.iter().all(|&i| flags[i])))
                    .collect();
                Ok(DesignRow {
                    request_id: record.request_id.clone(),
                    problem_id: record.problem_id.clone(),
                    combination_index: record.combination.to_mask(set)?,
                    values,
                    correct: record.correct,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(Self {
            columns,
            terms,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[DesignRow] {
        &self.rows
    }

    /// Number of component indices multiplied into each column.
    pub fn column_orders(&self) -> impl Iterator<Item = usize> + '_ {
        self.terms.iter().map(Vec::len)
    }

    /// A row as a flat JSON object keyed by column name.
    pub fn row_object(&self, row: &DesignRow) -> Map<String, Value> {
        let mut object = Map::new();
        object.insert("request_id".into(), Value::from(row.request_id.as_str()));
        object.insert("problem_id".into(), Value::from(row.problem_id.as_str()));
        object.insert(
            "combination_index".into(),
            Value::from(row.combination_index),
        );
        for (column, value) in self.columns.iter().zip(&row.values) {
            object.insert(column.clone(), Value::from(*value));
        }
        object.insert(RESPONSE_COLUMN.into(), Value::from(u8::from(row.correct)));
        object
    }

    /// Indicator row for a bare combination (no record attached).
    pub fn indicator_values(
        &self,
        set: &ComponentSet,
        combination: &Combination,
    ) -> Result<Vec<u8>, DomainError> {
        let flags = combination.flags(set)?;
        Ok(self
            .terms
            .iter()
            .map(|term| u8::from(term.iter().all(|&i| flags[i])))
            .collect())
    }
}

/// All `k`-element subsets of `0..n` in lexicographic order.
fn index_subsets(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 || k > n {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut current: Vec<usize> = (0..k).collect();
    loop {
        out.push(current.clone());
        let Some(pos) = (0..k).rev().find(|&i| current[i] < n - k + i) else {
            return out;
        };
        current[pos] += 1;
        for i in pos + 1..k {
            current[i] = current[i - 1] + 1;
        }
    }
}
