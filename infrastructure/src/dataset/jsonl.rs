//! JSON Lines readers for problems and worked examples.

use ablation_domain::{Problem, WorkedExample};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: duplicate problem id '{id}'")]
    DuplicateProblem { path: PathBuf, id: String },
}

/// Read every non-blank line of a JSONL file as `T`.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    let io_error = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(io_error)?);

    let mut items = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(io_error)?;
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(&line).map_err(|source| DatasetError::Parse {
            path: path.to_path_buf(),
            line: i + 1,
            source,
        })?;
        items.push(item);
    }
    debug!("Read {} rows from {}", items.len(), path.display());
    Ok(items)
}

/// Load problems; ids must be unique since they key every request.
pub fn load_problems(path: &Path) -> Result<Vec<Problem>, DatasetError> {
    let problems: Vec<Problem> = read_jsonl(path)?;
    let mut seen = HashSet::new();
    for problem in &problems {
        if !seen.insert(problem.unique_id.as_str()) {
            return Err(DatasetError::DuplicateProblem {
                path: path.to_path_buf(),
                id: problem.unique_id.clone(),
            });
        }
    }
    Ok(problems)
}

/// Load worked examples. A missing file means no examples.
pub fn load_examples(path: &Path) -> Result<Vec<WorkedExample>, DatasetError> {
    if !path.exists() {
        debug!("No examples file at {}", path.display());
        return Ok(Vec::new());
    }
    read_jsonl(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_problems_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("problems.jsonl");
        fs::write(
            &path,
            concat!(
                r#"{"unique_id": "test/algebra/1.json", "problem": "2+2?", "answer": "4", "subject": "Algebra", "level": 1}"#,
                "\n\n",
                r#"{"unique_id": "test/algebra/2.json", "problem": "3+3?", "answer": "6"}"#,
                "\n"
            ),
        )
        .unwrap();

        let problems = load_problems(&path).unwrap();
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].subject.as_deref(), Some("Algebra"));
        assert_eq!(problems[1].answer, "6");
    }

    #[test]
    fn test_parse_error_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("problems.jsonl");
        fs::write(
            &path,
            "{\"unique_id\": \"a\", \"problem\": \"p\", \"answer\": \"1\"}\n{not json}\n",
        )
        .unwrap();

        match load_problems(&path).unwrap_err() {
            DatasetError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_problem_ids_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("problems.jsonl");
        let row = r#"{"unique_id": "a", "problem": "p", "answer": "1"}"#;
        fs::write(&path, format!("{row}\n{row}\n")).unwrap();
        assert!(matches!(
            load_problems(&path),
            Err(DatasetError::DuplicateProblem { .. })
        ));
    }

    #[test]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_examples(&dir.path().join("examples.jsonl")).unwrap().is_empty());
        assert!(matches!(
            load_problems(&dir.path().join("problems.jsonl")),
            Err(DatasetError::Io { .. })
        ));
    }
}
