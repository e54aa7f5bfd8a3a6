//! Prompt assembly
//!
//! Layout of an assembled prompt:
//!
//! ```text
//! <prefix>* <base problem>[ <inline>*] <suffix>*
//! ```
//!
//! Prefix and suffix texts keep the component set's order and are joined by
//! the assembler's separator. Inline texts follow the base problem directly,
//! joined by a single space. Empty fragments are dropped, so the baseline
//! combination yields the base problem unchanged.

use crate::combination::Combination;
use crate::component::{ComponentSet, Position};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Default separator between prompt blocks.
pub const DEFAULT_SEPARATOR: &str = " ";

/// A fully assembled prompt plus the combination that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptVariant {
    pub prompt: String,
    pub combination: Combination,
}

/// Pure prompt builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAssembler {
    separator: String,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl PromptAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Assemble the prompt for `combination` applied to `base_problem`.
    ///
    /// Fails if the combination names a component outside `set`, repeats a
    /// component, or lacks an entry for one of them.
    pub fn assemble(
        &self,
        base_problem: &str,
        combination: &Combination,
        set: &ComponentSet,
    ) -> Result<PromptVariant, DomainError> {
        combination.validate_against(set)?;

        let mut prefixes = Vec::new();
        let mut inline = Vec::new();
        let mut suffixes = Vec::new();

        for component in set {
            if combination.is_included(component.name()) != Some(true) {
                continue;
            }
            let text = component.text();
            if text.is_empty() {
                continue;
            }
            match component.position() {
                Position::Prefix => prefixes.push(text),
                Position::Inline => inline.push(text),
                Position::Suffix => suffixes.push(text),
            }
        }

        let core = std::iter::once(base_problem)
            .chain(inline)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let prompt = prefixes
            .into_iter()
            .chain(std::iter::once(core.as_str()))
            .chain(suffixes)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(&self.separator);

        Ok(PromptVariant {
            prompt,
            combination: combination.clone(),
        })
    }
}

/// Assemble with the default separator.
pub fn assemble(
    base_problem: &str,
    combination: &Combination,
    set: &ComponentSet,
) -> Result<PromptVariant, DomainError> {
    PromptAssembler::default().assemble(base_problem, combination, set)
}
