//! Component definitions from TOML (`[[components]]` tables)

use ablation_domain::{ComponentSet, DomainError, Position, PromptComponent};
use serde::{Deserialize, Serialize};

/// One `[[components]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileComponentConfig {
    pub name: String,
    pub text: String,
    pub position: Position,
}

impl FileComponentConfig {
    fn new(name: &str, text: &str, position: Position) -> Self {
        Self {
            name: name.to_string(),
            text: text.to_string(),
            position,
        }
    }

    pub fn to_component(&self) -> PromptComponent {
        PromptComponent::new(self.name.clone(), self.text.clone(), self.position)
    }
}

/// Build the ordered set; order in the file fixes the bit order.
pub fn to_component_set(components: &[FileComponentConfig]) -> Result<ComponentSet, DomainError> {
    ComponentSet::from_components(components.iter().map(FileComponentConfig::to_component))
}

/// The ablatable components of the math-reasoning domain.
pub fn default_components() -> Vec<FileComponentConfig> {
    vec![
        FileComponentConfig::new(
            "Role_Assignment",
            "You are an expert mathematician with extensive training in mathematical reasoning and problem solving.",
            Position::Prefix,
        ),
        FileComponentConfig::new(
            "Example_Solution",
            "Here is an example of a solution to a similar problem:\n\nExample problem:\n{example_problem}\n\nExample solution:\n{example_solution}",
            Position::Prefix,
        ),
        FileComponentConfig::new(
            "Chain_of_Thought",
            "Solve the given problem step-by-step, showing all your work clearly.",
            Position::Suffix,
        ),
        FileComponentConfig::new(
            "Self_Verification",
            "After finding your answer, check your work to verify it before submitting your final answer.",
            Position::Suffix,
        ),
    ]
}
