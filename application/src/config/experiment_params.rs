//! Experiment parameters: how prompts are built.

use ablation_domain::prompt::DEFAULT_SEPARATOR;
use ablation_domain::DEFAULT_MAX_COMPONENTS;
use serde::{Deserialize, Serialize};

/// Base prompt every variant starts from; `{problem}` is the problem text.
pub const DEFAULT_BASE_TEMPLATE: &str = "You are tasked with solving a math problem.\n\nProblem statement:\n\n{problem}\n\nPlace your final answer in <answer> tags.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentParams {
    /// Base prompt; must contain `{problem}`.
    pub base_template: String,
    /// Text between assembled blocks.
    pub separator: String,
    /// Safety ceiling on toggleable components.
    pub max_components: usize,
    /// Highest interaction order exported for analysis (`None` = full factorial).
    pub max_interaction_order: Option<usize>,
    /// Model name recorded with results.
    pub model: String,
}

impl Default for ExperimentParams {
    fn default() -> Self {
        Self {
            base_template: DEFAULT_BASE_TEMPLATE.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            max_components: DEFAULT_MAX_COMPONENTS,
            max_interaction_order: None,
            model: "mock".to_string(),
        }
    }
}

impl ExperimentParams {
    pub fn with_base_template(mut self, template: impl Into<String>) -> Self {
        self.base_template = template.into();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_max_components(mut self, max: usize) -> Self {
        self.max_components = max;
        self
    }

    pub fn with_max_interaction_order(mut self, order: Option<usize>) -> Self {
        self.max_interaction_order = order;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}
