//! Experiment configuration from TOML (`[experiment]` section)

use ablation_application::config::DEFAULT_BASE_TEMPLATE;
use ablation_domain::DEFAULT_MAX_COMPONENTS;
use ablation_domain::prompt::DEFAULT_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw experiment configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExperimentConfig {
    pub name: String,
    /// Holds problems.jsonl, examples.jsonl and result files
    pub data_dir: PathBuf,
    pub max_components: usize,
    pub separator: String,
    /// Base prompt; `{problem}` is replaced by the problem text
    pub base_template: String,
    /// `None` exports the full factorial
    pub max_interaction_order: Option<usize>,
}

impl Default for FileExperimentConfig {
    fn default() -> Self {
        Self {
            name: "math_reasoning".to_string(),
            data_dir: PathBuf::from("data"),
            max_components: DEFAULT_MAX_COMPONENTS,
            separator: DEFAULT_SEPARATOR.to_string(),
            base_template: DEFAULT_BASE_TEMPLATE.to_string(),
            max_interaction_order: None,
        }
    }
}

impl FileExperimentConfig {
    pub fn problems_path(&self) -> PathBuf {
        self.data_dir.join("problems.jsonl")
    }

    pub fn examples_path(&self) -> PathBuf {
        self.data_dir.join("examples.jsonl")
    }

    pub fn design_matrix_path(&self) -> PathBuf {
        self.data_dir.join("design_matrix.jsonl")
    }

    /// Accuracy summary written by `analyze`, e.g. `math_reasoning_summary.json`.
    pub fn summary_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}_summary.json", self.name))
    }
}
