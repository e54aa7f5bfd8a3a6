//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Every variant is a local validation failure detected before any request
/// leaves the process. None of them are transient.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Duplicate component name: {0}")]
    DuplicateName(String),

    #[error("Invalid component: {0}")]
    InvalidComponent(String),

    #[error(
        "Combinatorial explosion: {components} components would produce 2^{components} variants (ceiling is {ceiling})"
    )]
    CombinatorialExplosion { components: usize, ceiling: usize },

    #[error("Combination references unknown component: {0}")]
    MissingComponent(String),

    #[error("Combination has no entry for component: {0}")]
    IncompleteCombination(String),

    #[error("Combination has more than one entry for component: {0}")]
    RepeatedEntry(String),

    #[error("Combination index {index} is out of range for {components} components")]
    IndexOutOfRange { index: u64, components: usize },
}

impl DomainError {
    /// True for errors that indicate a caller bug at assembly time.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            DomainError::MissingComponent(_)
                | DomainError::IncompleteCombination(_)
                | DomainError::RepeatedEntry(_)
                | DomainError::IndexOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explosion_display() {
        let error = DomainError::CombinatorialExplosion {
            components: 21,
            ceiling: 20,
        };
        assert_eq!(
            error.to_string(),
            "Combinatorial explosion: 21 components would produce 2^21 variants (ceiling is 20)"
        );
    }

    #[test]
    fn test_contract_violation_check() {
        assert!(DomainError::MissingComponent("X".into()).is_contract_violation());
        assert!(DomainError::IncompleteCombination("X".into()).is_contract_violation());
        assert!(DomainError::RepeatedEntry("X".into()).is_contract_violation());
        assert!(!DomainError::DuplicateName("X".into()).is_contract_violation());
        assert!(
            !DomainError::CombinatorialExplosion {
                components: 30,
                ceiling: 20
            }
            .is_contract_violation()
        );
    }
}
