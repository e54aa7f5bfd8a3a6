//! Power-set enumeration over a component set

use super::value_objects::Combination;
use crate::component::ComponentSet;
use crate::core::error::DomainError;
use std::ops::Range;

/// Default safety ceiling on the number of toggleable components.
///
/// Every variant is a billed API call per problem, so 2^20 is already far
/// past anything a real run should attempt.
pub const DEFAULT_MAX_COMPONENTS: usize = 20;

/// Hard limit imposed by the `u64` index space.
pub const MAX_SUPPORTED_COMPONENTS: usize = 63;

/// Deterministic enumerator of every subset of a [`ComponentSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinationGenerator {
    max_components: usize,
}

impl Default for CombinationGenerator {
    fn default() -> Self {
        Self {
            max_components: DEFAULT_MAX_COMPONENTS,
        }
    }
}

impl CombinationGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the ceiling (clamped to [`MAX_SUPPORTED_COMPONENTS`]).
    pub fn with_max_components(max_components: usize) -> Self {
        Self {
            max_components: max_components.min(MAX_SUPPORTED_COMPONENTS),
        }
    }

    pub fn max_components(&self) -> usize {
        self.max_components
    }

    /// Number of combinations `generate` would yield, after the ceiling check.
    pub fn variant_count(&self, set: &ComponentSet) -> Result<u64, DomainError> {
        self.check_ceiling(set)?;
        Ok(1u64 << set.len())
    }

    /// Every combination, in ascending index order.
    ///
    /// Fails before producing anything if the set exceeds the ceiling.
    pub fn generate(&self, set: &ComponentSet) -> Result<Combinations, DomainError> {
        let total = self.variant_count(set)?;
        Ok(Combinations::new(set.clone(), 0..total))
    }

    /// A contiguous slice `[start, end)` of the index space.
    pub fn generate_range(
        &self,
        set: &ComponentSet,
        range: Range<u64>,
    ) -> Result<Combinations, DomainError> {
        let total = self.variant_count(set)?;
        if range.end > total {
            return Err(DomainError::IndexOutOfRange {
                index: range.end - 1,
                components: set.len(),
            });
        }
        let start = range.start.min(range.end);
        Ok(Combinations::new(set.clone(), start..range.end))
    }

    fn check_ceiling(&self, set: &ComponentSet) -> Result<(), DomainError> {
        if set.len() > self.max_components {
            return Err(DomainError::CombinatorialExplosion {
                components: set.len(),
                ceiling: self.max_components,
            });
        }
        Ok(())
    }
}

/// Lazy, restartable sequence of combinations over an index range.
///
/// Each item is derived from its index and the shared set alone, so
/// shards can be consumed on different workers without coordination.
#[derive(Debug, Clone)]
pub struct Combinations {
    set: ComponentSet,
    front: u64,
    back: u64,
}

impl Combinations {
    fn new(set: ComponentSet, range: Range<u64>) -> Self {
        Self {
            set,
            front: range.start,
            back: range.end,
        }
    }

    /// Remaining index range.
    pub fn range(&self) -> Range<u64> {
        self.front..self.back
    }

    pub fn component_set(&self) -> &ComponentSet {
        &self.set
    }

    /// Shard `k` of `n` contiguous, disjoint pieces of the remaining range.
    ///
    /// Earlier shards take the remainder, so sizes differ by at most one.
    /// Returns `None` when `n == 0` or `k >= n`.
    pub fn shard(&self, k: usize, n: usize) -> Option<Combinations> {
        if n == 0 || k >= n {
            return None;
        }
        let total = self.back - self.front;
        let n64 = n as u64;
        let k64 = k as u64;
        let base = total / n64;
        let extra = total % n64;
        let start = self.front + k64 * base + k64.min(extra);
        let len = base + u64::from(k64 < extra);
        Some(Combinations::new(self.set.clone(), start..start + len))
    }

    /// Split the remaining range into `n` shards (see [`Combinations::shard`]).
    pub fn shards(&self, n: usize) -> Vec<Combinations> {
        (0..n).filter_map(|k| self.shard(k, n)).collect()
    }

    /// Pair every item with its index.
    pub fn indexed(self) -> impl Iterator<Item = (u64, Combination)> {
        let set = self.set;
        (self.front..self.back).map(move |i| (i, Combination::decode(&set, i)))
    }
}

impl Iterator for Combinations {
    type Item = Combination;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let combo = Combination::decode(&self.set, self.front);
        self.front += 1;
        Some(combo)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.back - self.front).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Combinations {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(Combination::decode(&self.set, self.back))
    }
}

impl ExactSizeIterator for Combinations {}
