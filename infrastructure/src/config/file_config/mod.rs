//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod components;
mod experiment;
mod llm;
mod output;
mod runner;

pub use components::{FileComponentConfig, default_components, to_component_set};
pub use experiment::FileExperimentConfig;
pub use llm::{FileLlmConfig, KNOWN_PROVIDERS};
pub use output::FileOutputConfig;
pub use runner::FileRunnerConfig;

use ablation_application::ExperimentParams;
use ablation_domain::prompt::PROBLEM_KEY;
use ablation_domain::{
    ComponentSet, ConfigIssue, ConfigIssueCode, DomainError, MAX_SUPPORTED_COMPONENTS,
    PromptTemplate,
};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub experiment: FileExperimentConfig,
    pub llm: FileLlmConfig,
    pub runner: FileRunnerConfig,
    pub output: FileOutputConfig,
    /// Ordered component catalog; order fixes the bit position of each component
    pub components: Vec<FileComponentConfig>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            experiment: FileExperimentConfig::default(),
            llm: FileLlmConfig::default(),
            runner: FileRunnerConfig::default(),
            output: FileOutputConfig::default(),
            components: default_components(),
        }
    }
}

impl FileConfig {
    pub fn component_set(&self) -> Result<ComponentSet, DomainError> {
        to_component_set(&self.components)
    }

    pub fn experiment_params(&self) -> ExperimentParams {
        ExperimentParams::default()
            .with_base_template(self.experiment.base_template.clone())
            .with_separator(self.experiment.separator.clone())
            .with_max_components(self.experiment.max_components)
            .with_max_interaction_order(self.experiment.max_interaction_order)
            .with_model(self.llm.model.clone())
    }

    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Provider
        if !KNOWN_PROVIDERS.contains(&self.llm.provider.as_str()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidEnumValue {
                    field: "llm.provider".to_string(),
                    value: self.llm.provider.clone(),
                    valid_values: KNOWN_PROVIDERS.iter().map(|p| p.to_string()).collect(),
                },
                format!("llm.provider: unknown provider '{}'", self.llm.provider),
            ));
        }

        // 2. Numeric ranges
        if self.runner.concurrency == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "runner.concurrency".to_string(),
                },
                "runner.concurrency must be at least 1",
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "llm.temperature".to_string(),
                },
                format!(
                    "llm.temperature {} is outside the usual 0.0-2.0 range",
                    self.llm.temperature
                ),
            ));
        }
        if self.experiment.max_components > MAX_SUPPORTED_COMPONENTS {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "experiment.max_components".to_string(),
                },
                format!(
                    "experiment.max_components is capped at {}",
                    MAX_SUPPORTED_COMPONENTS
                ),
            ));
        }
        if self.experiment.max_interaction_order == Some(0) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "experiment.max_interaction_order".to_string(),
                },
                "experiment.max_interaction_order must be at least 1",
            ));
        }

        // 3. Base template
        if !PromptTemplate::placeholders(&self.experiment.base_template).contains(&PROBLEM_KEY) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingPlaceholder {
                    field: "experiment.base_template".to_string(),
                    placeholder: PROBLEM_KEY.to_string(),
                },
                "experiment.base_template must contain {problem}",
            ));
        }

        // 4. Components
        if self.components.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::NoComponents,
                "no [[components]] configured; only the baseline prompt will run",
            ));
        } else if let Err(e) = self.component_set() {
            let name = match &e {
                DomainError::DuplicateName(name) => name.clone(),
                other => other.to_string(),
            };
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidComponent { name },
                format!("components: {}", e),
            ));
        } else if self.components.len() > self.experiment.max_components {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "experiment.max_components".to_string(),
                },
                format!(
                    "{} components exceed experiment.max_components = {}",
                    self.components.len(),
                    self.experiment.max_components
                ),
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ablation_domain::{OutputFormat, Position, Severity};
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[experiment]
name = "pilot"
data_dir = "runs/pilot"
separator = "\n\n"
max_interaction_order = 2

[llm]
provider = "mock"
model = "gpt-4o-mini"
temperature = 0.7
seed = 7

[runner]
concurrency = 8
timeout_secs = 30

[output]
format = "json"
color = false

[[components]]
name = "Role_Assignment"
text = "You are an expert."
position = "prefix"

[[components]]
name = "Self_Verification"
text = "Check your work."
position = "suffix"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.experiment.name, "pilot");
        assert_eq!(config.experiment.data_dir, PathBuf::from("runs/pilot"));
        assert_eq!(config.experiment.separator, "\n\n");
        assert_eq!(config.experiment.max_interaction_order, Some(2));
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.seed, 7);
        assert_eq!(config.runner.concurrency, 8);
        // Unspecified fields keep their defaults
        assert_eq!(config.runner.max_retries, FileRunnerConfig::default().max_retries);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(!config.output.color);

        assert_eq!(config.components.len(), 2);
        assert_eq!(config.components[1].position, Position::Suffix);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert_eq!(config.components.len(), 4);
        assert!(config.validate().is_empty());
        assert_eq!(config.component_set().unwrap().len(), 4);
    }

    #[test]
    fn test_experiment_params_from_config() {
        let mut config = FileConfig::default();
        config.experiment.separator = "\n\n".to_string();
        config.llm.model = "m".to_string();
        let params = config.experiment_params();
        assert_eq!(params.separator, "\n\n");
        assert_eq!(params.model, "m");
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let mut config = FileConfig::default();
        config.llm.provider = "carrier-pigeon".to_string();
        config.runner.concurrency = 0;
        config.experiment.base_template = "Solve it.".to_string();

        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.severity == Severity::Error));
        assert!(matches!(
            &issues[0].code,
            ConfigIssueCode::InvalidEnumValue { field, .. } if field == "llm.provider"
        ));
    }

    #[test]
    fn test_validate_components() {
        let mut config = FileConfig::default();
        config.components.clear();
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);

        let mut config = FileConfig::default();
        config.components[1].name = "Role_Assignment".to_string();
        let issues = config.validate();
        assert_eq!(
            issues[0].code,
            ConfigIssueCode::InvalidComponent {
                name: "Role_Assignment".to_string()
            }
        );

        let mut config = FileConfig::default();
        config.experiment.max_components = 3;
        assert_eq!(config.validate().len(), 1);
    }

    #[test]
    fn test_unknown_position_rejected() {
        let toml_str = r#"
[[components]]
name = "X"
text = "x"
position = "middle"
"#;
        assert!(toml::from_str::<FileConfig>(toml_str).is_err());
    }
}
