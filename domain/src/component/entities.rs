//! Prompt component value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a component's text is spliced relative to the base problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Before the base problem
    Prefix,
    /// After the base problem
    Suffix,
    /// Immediately adjacent to the base problem text
    Inline,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Prefix => "prefix",
            Position::Suffix => "suffix",
            Position::Inline => "inline",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(Position::Prefix),
            "suffix" => Ok(Position::Suffix),
            "inline" => Ok(Position::Inline),
            other => Err(format!(
                "unknown position '{}' (expected prefix, suffix or inline)",
                other
            )),
        }
    }
}

/// A named, fixed fragment of prompt text (Value Object)
///
/// Immutable once constructed; the registry owns the uniqueness rule.
///
/// # Example
///
/// ```
/// use ablation_domain::{Position, PromptComponent};
///
/// let role = PromptComponent::prefix("Role_Assignment", "You are an expert mathematician.");
/// assert_eq!(role.position(), Position::Prefix);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptComponent {
    name: String,
    text: String,
    position: Position,
}

impl PromptComponent {
    pub fn new(name: impl Into<String>, text: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            position,
        }
    }

    pub fn prefix(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, text, Position::Prefix)
    }

    pub fn suffix(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, text, Position::Suffix)
    }

    pub fn inline(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, text, Position::Inline)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parse_case_insensitive() {
        assert_eq!("PREFIX".parse::<Position>(), Ok(Position::Prefix));
        assert_eq!(" suffix ".parse::<Position>(), Ok(Position::Suffix));
        assert_eq!("Inline".parse::<Position>(), Ok(Position::Inline));
        assert!("middle".parse::<Position>().is_err());
    }

    #[test]
    fn test_position_serde_lowercase() {
        let json = serde_json::to_string(&Position::Suffix).unwrap();
        assert_eq!(json, "\"suffix\"");
        let parsed: Position = serde_json::from_str("\"inline\"").unwrap();
        assert_eq!(parsed, Position::Inline);
    }

    #[test]
    fn test_component_deserialize() {
        let component: PromptComponent = serde_json::from_str(
            r#"{"name": "Chain_of_Thought", "text": "Think step by step.", "position": "suffix"}"#,
        )
        .unwrap();
        assert_eq!(component.name(), "Chain_of_Thought");
        assert_eq!(component.text(), "Think step by step.");
        assert_eq!(component.position(), Position::Suffix);
    }
}
