//! Descriptive accuracy summaries

use crate::component::ComponentSet;
use crate::core::error::DomainError;
use crate::experiment::ExperimentRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Accuracy of one combination across problems.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationAccuracy {
    pub index: u64,
    pub label: String,
    pub trials: usize,
    pub correct: usize,
    pub accuracy: f64,
}

/// Marginal accuracy with and without one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainEffect {
    pub component: String,
    pub accuracy_with: f64,
    pub accuracy_without: f64,
    /// `accuracy_with - accuracy_without`
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracySummary {
    pub trials: usize,
    pub correct: usize,
    pub accuracy: f64,
    /// Observed combinations in index order
    pub combinations: Vec<CombinationAccuracy>,
    /// One entry per component in set order
    pub main_effects: Vec<MainEffect>,
}

#[derive(Default, Clone, Copy)]
struct Tally {
    trials: usize,
    correct: usize,
}

impl Tally {
    fn add(&mut self, correct: bool) {
        self.trials += 1;
        self.correct += usize::from(correct);
    }

    fn accuracy(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.correct as f64 / self.trials as f64
        }
    }
}

impl AccuracySummary {
    pub fn from_records(
        set: &ComponentSet,
        records: &[ExperimentRecord],
    ) -> Result<Self, DomainError> {
        let mut overall = Tally::default();
        let mut by_combination: BTreeMap<u64, (String, Tally)> = BTreeMap::new();
        let mut with = vec![Tally::default(); set.len()];
        let mut without = vec![Tally::default(); set.len()];

        for record in records {
            let flags = record.flags(set)?;
            let index = record.combination.to_mask(set)?;
            overall.add(record.correct);
            by_combination
                .entry(index)
                .or_insert_with(|| (record.combination.label(), Tally::default()))
                .1
                .add(record.correct);
            for (bit, on) in flags.into_iter().enumerate() {
                if on {
                    with[bit].add(record.correct);
                } else {
                    without[bit].add(record.correct);
                }
            }
        }

        let combinations = by_combination
            .into_iter()
            .map(|(index, (label, tally))| CombinationAccuracy {
                index,
                label,
                trials: tally.trials,
                correct: tally.correct,
                accuracy: tally.accuracy(),
            })
            .collect();

        let main_effects = set
            .names()
            .zip(with.iter().zip(&without))
            .map(|(name, (w, wo))| MainEffect {
                component: name.to_string(),
                accuracy_with: w.accuracy(),
                accuracy_without: wo.accuracy(),
                delta: w.accuracy() - wo.accuracy(),
            })
            .collect();

        Ok(Self {
            trials: overall.trials,
            correct: overall.correct,
            accuracy: overall.accuracy(),
            combinations,
            main_effects,
        })
    }

    /// Best observed combination (ties go to the lower index).
    pub fn best(&self) -> Option<&CombinationAccuracy> {
        self.combinations.iter().fold(None, |best, c| match best {
            Some(b) if b.accuracy >= c.accuracy => Some(b),
            _ => Some(c),
        })
    }
}
