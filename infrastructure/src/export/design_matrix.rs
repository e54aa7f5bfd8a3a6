//! Writers for the design matrix and analysis summaries.

use ablation_domain::DesignMatrix;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write one JSON object per matrix row.
///
/// Each object carries `request_id`, `problem_id`, `combination_index`, one
/// 0/1 field per column and the `correct` response, which is the shape
/// dataframe readers expect from JSON Lines.
pub fn write_design_matrix(path: &Path, matrix: &DesignMatrix) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for row in matrix.rows() {
        let line = serde_json::to_string(&matrix.row_object(row))?;
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    info!(
        "Wrote {} rows x {} columns to {}",
        matrix.rows().len(),
        matrix.columns().len(),
        path.display()
    );
    Ok(())
}

/// Pretty-printed JSON document.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ablation_domain::{Combination, ComponentSet, ExperimentRecord, PromptComponent};

    #[test]
    fn test_write_design_matrix() {
        let set = ComponentSet::from_components([
            PromptComponent::prefix("Role Assignment", "r"),
            PromptComponent::suffix("Verify", "v"),
        ]);
        // Whitespace in names is rejected at registration
        assert!(set.is_err());

        let set = ComponentSet::from_components([
            PromptComponent::prefix("Role-Assignment", "r"),
            PromptComponent::suffix("Verify", "v"),
        ])
        .unwrap();
        let records: Vec<_> = (0..4)
            .map(|i| ExperimentRecord {
                request_id: format!("{i}_1"),
                problem_id: "1".to_string(),
                combination_index: i,
                combination: Combination::from_index(&set, i).unwrap(),
                response_answer: String::new(),
                expected_answer: String::new(),
                correct: i == 3,
                model: String::new(),
                recorded_at: String::new(),
            })
            .collect();
        let matrix = DesignMatrix::from_records(&set, &records, None).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("design_matrix.jsonl");
        write_design_matrix(&path, &matrix).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3]["Role_Assignment:Verify"], 1);
        assert_eq!(rows[3]["correct"], 1);
        assert_eq!(rows[1]["Role_Assignment"], 1);
        assert_eq!(rows[1]["Verify"], 0);
    }
}
