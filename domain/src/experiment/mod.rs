//! Experiment data: problems, records and answer grading

mod entities;
pub mod grading;

pub use entities::{ExperimentRecord, Problem, WorkedExample, request_id};
pub use grading::{extract_answer, grade_answer};
