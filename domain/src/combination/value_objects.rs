//! Combination value object
//!
//! A combination assigns on/off to every component of a [`ComponentSet`].
//!
//! # Bit order
//!
//! Under a fixed set, a combination is equivalent to an integer in
//! `[0, 2^N)`: bit `j` (least significant first) is component `j` in
//! registration order. This integer is the join key with the analysis
//! columns, so it must never change for a given set.

use crate::component::ComponentSet;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One experimental condition: an inclusion flag per component name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combination {
    entries: Vec<(String, bool)>,
}

impl Combination {
    /// Decode a bitmask under the set's bit order.
    pub fn from_index(set: &ComponentSet, index: u64) -> Result<Self, DomainError> {
        let n = set.len();
        if n < u64::BITS as usize && index >> n != 0 {
            return Err(DomainError::IndexOutOfRange {
                index,
                components: n,
            });
        }
        Ok(Self::decode(set, index))
    }

    /// Decode without the range check; callers guarantee `index < 2^N`.
    pub(crate) fn decode(set: &ComponentSet, index: u64) -> Self {
        let entries = set
            .iter()
            .enumerate()
            .map(|(bit, component)| {
                let on = index.checked_shr(bit as u32).unwrap_or(0) & 1 == 1;
                (component.name().to_string(), on)
            })
            .collect();
        Self { entries }
    }

    /// Build from a boolean vector in set order.
    pub fn from_flags(set: &ComponentSet, flags: &[bool]) -> Result<Self, DomainError> {
        if let Some(component) = set.all().get(flags.len()) {
            return Err(DomainError::IncompleteCombination(
                component.name().to_string(),
            ));
        }
        if flags.len() > set.len() {
            return Err(DomainError::MissingComponent(format!(
                "flag #{} (set has {} components)",
                set.len(),
                set.len()
            )));
        }
        let entries = set
            .names()
            .zip(flags)
            .map(|(name, on)| (name.to_string(), *on))
            .collect();
        Ok(Self { entries })
    }

    /// Build from caller-supplied pairs; no validation until it meets a set.
    pub fn from_entries<N: Into<String>>(entries: impl IntoIterator<Item = (N, bool)>) -> Self {
        Self {
            entries: entries.into_iter().map(|(n, on)| (n.into(), on)).collect(),
        }
    }

    pub fn entries(&self) -> &[(String, bool)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inclusion flag for a component, `None` if the combination has no entry.
    pub fn is_included(&self, name: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, on)| *on)
    }

    /// Names of included components, in entry order.
    pub fn included(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, on)| *on)
            .map(|(n, _)| n.as_str())
    }

    pub fn included_count(&self) -> usize {
        self.entries.iter().filter(|(_, on)| *on).count()
    }

    /// Short human label, e.g. `Role+Verify` or `baseline`.
    pub fn label(&self) -> String {
        let names: Vec<_> = self.included().collect();
        if names.is_empty() {
            "baseline".to_string()
        } else {
            names.join("+")
        }
    }

    /// Check that this combination covers exactly the components of `set`,
    /// one entry each.
    pub fn validate_against(&self, set: &ComponentSet) -> Result<(), DomainError> {
        if let Some((name, _)) = self.entries.iter().find(|(n, _)| set.get(n).is_none()) {
            return Err(DomainError::MissingComponent(name.clone()));
        }
        let mut seen = HashSet::with_capacity(self.entries.len());
        if let Some((name, _)) = self.entries.iter().find(|(n, _)| !seen.insert(n.as_str())) {
            return Err(DomainError::RepeatedEntry(name.clone()));
        }
        if let Some(name) = set.names().find(|n| self.is_included(n).is_none()) {
            return Err(DomainError::IncompleteCombination(name.to_string()));
        }
        Ok(())
    }

    /// Fixed-width boolean vector in set order.
    pub fn flags(&self, set: &ComponentSet) -> Result<Vec<bool>, DomainError> {
        self.validate_against(set)?;
        Ok(set
            .names()
            .map(|n| self.is_included(n).unwrap_or(false))
            .collect())
    }

    /// Bitmask under the set's bit order.
    pub fn to_mask(&self, set: &ComponentSet) -> Result<u64, DomainError> {
        let flags = self.flags(set)?;
        Ok(flags
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .fold(0u64, |mask, (bit, _)| mask | (1u64 << bit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::PromptComponent;

    fn set() -> ComponentSet {
        ComponentSet::from_components([
            PromptComponent::prefix("A", "Expert."),
            PromptComponent::suffix("B", "Verify."),
            PromptComponent::inline("C", "(show work)"),
        ])
        .unwrap()
    }

    #[test]
    fn test_bit_order_least_significant_first() {
        let combo = Combination::from_index(&set(), 0b101).unwrap();
        assert_eq!(combo.is_included("A"), Some(true));
        assert_eq!(combo.is_included("B"), Some(false));
        assert_eq!(combo.is_included("C"), Some(true));
        assert_eq!(combo.flags(&set()).unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_mask_roundtrip_for_every_index() {
        let set = set();
        for index in 0..8 {
            let combo = Combination::from_index(&set, index).unwrap();
            assert_eq!(combo.to_mask(&set).unwrap(), index);
            assert_eq!(combo.len(), 3);
        }
    }

    #[test]
    fn test_index_out_of_range() {
        let err = Combination::from_index(&set(), 8).unwrap_err();
        assert_eq!(
            err,
            DomainError::IndexOutOfRange {
                index: 8,
                components: 3
            }
        );
    }

    #[test]
    fn test_from_flags_requires_full_width() {
        let set = set();
        assert_eq!(
            Combination::from_flags(&set, &[true, false]).unwrap_err(),
            DomainError::IncompleteCombination("C".to_string())
        );
        assert!(matches!(
            Combination::from_flags(&set, &[true, false, true, true]),
            Err(DomainError::MissingComponent(_))
        ));
        let combo = Combination::from_flags(&set, &[false, true, false]).unwrap();
        assert_eq!(combo.to_mask(&set).unwrap(), 0b010);
    }

    #[test]
    fn test_validate_against_unknown_and_missing() {
        let set = set();
        let unknown = Combination::from_entries([("A", true), ("B", false), ("C", false), ("Z", true)]);
        assert_eq!(
            unknown.validate_against(&set).unwrap_err(),
            DomainError::MissingComponent("Z".to_string())
        );

        let partial = Combination::from_entries([("A", true), ("C", false)]);
        assert_eq!(
            partial.validate_against(&set).unwrap_err(),
            DomainError::IncompleteCombination("B".to_string())
        );
    }

    #[test]
    fn test_validate_against_repeated_entry() {
        let set = set();
        let repeated =
            Combination::from_entries([("A", true), ("A", false), ("B", false), ("C", false)]);
        assert_eq!(
            repeated.validate_against(&set).unwrap_err(),
            DomainError::RepeatedEntry("A".to_string())
        );
        assert!(repeated.flags(&set).is_err());
    }

    #[test]
    fn test_label_and_counts() {
        let set = set();
        assert_eq!(Combination::from_index(&set, 0).unwrap().label(), "baseline");
        let combo = Combination::from_index(&set, 0b011).unwrap();
        assert_eq!(combo.label(), "A+B");
        assert_eq!(combo.included_count(), 2);
    }

    #[test]
    fn test_empty_set_single_empty_combination() {
        let empty = ComponentSet::empty();
        let combo = Combination::from_index(&empty, 0).unwrap();
        assert!(combo.is_empty());
        assert_eq!(combo.to_mask(&empty).unwrap(), 0);
        assert!(Combination::from_index(&empty, 1).is_err());
    }
}
