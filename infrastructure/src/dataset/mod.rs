//! Benchmark dataset files
//!
//! `problems.jsonl` and `examples.jsonl` hold one JSON object per line.

mod jsonl;

pub use jsonl::{DatasetError, load_examples, load_problems, read_jsonl};
