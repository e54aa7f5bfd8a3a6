//! Benchmark problems and experiment records

use crate::combination::Combination;
use crate::component::ComponentSet;
use crate::core::error::DomainError;
use crate::core::string::sanitize_identifier;
use serde::{Deserialize, Serialize};

/// One benchmark problem (a row of `problems.jsonl`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Dataset identifier, e.g. `test/algebra/1234.json`
    pub unique_id: String,
    /// Problem statement (the base prompt)
    pub problem: String,
    /// Ground-truth final answer
    pub answer: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub solution: Option<String>,
}

impl Problem {
    pub fn new(
        unique_id: impl Into<String>,
        problem: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            problem: problem.into(),
            answer: answer.into(),
            subject: None,
            level: None,
            solution: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Short id: the unique id without a `.json` suffix, sanitized.
    ///
    /// `test/algebra/1234.json` becomes `test_algebra_1234`. The subject
    /// directory stays in, since problem numbers repeat across subjects.
    pub fn short_id(&self) -> String {
        let trimmed = self
            .unique_id
            .strip_suffix(".json")
            .unwrap_or(&self.unique_id);
        sanitize_identifier(trimmed)
    }
}

/// A worked example used to fill an example component (a row of `examples.jsonl`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkedExample {
    pub subject: String,
    pub problem: String,
    pub solution: String,
}

/// Request id for a (combination, problem) pair: `<index>_<short id>`.
///
/// Stable across runs, so it doubles as the resume key.
pub fn request_id(combination_index: u64, problem: &Problem) -> String {
    format!("{}_{}", combination_index, problem.short_id())
}

/// Outcome of one (problem, combination) trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub request_id: String,
    pub problem_id: String,
    /// Bitmask of the combination under the set's bit order
    pub combination_index: u64,
    pub combination: Combination,
    /// Answer extracted from the response (empty if none was found)
    pub response_answer: String,
    pub expected_answer: String,
    pub correct: bool,
    #[serde(default)]
    pub model: String,
    /// RFC 3339 timestamp
    #[serde(default)]
    pub recorded_at: String,
}

impl ExperimentRecord {
    /// Fixed-width indicator vector for the analysis join.
    pub fn flags(&self, set: &ComponentSet) -> Result<Vec<bool>, DomainError> {
        self.combination.flags(set)
    }
}
