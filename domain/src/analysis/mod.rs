//! Analysis export
//!
//! Shapes experiment records into what an external OLS/ANOVA routine
//! consumes (design matrix and formula) and computes the descriptive
//! summaries that need no model fit.

mod design;
mod effect_size;
mod summary;

pub use design::{DesignMatrix, DesignRow, RESPONSE_COLUMN, formula};
pub use effect_size::{AnovaTerm, EffectSize, TermEffect, effect_sizes, partial_eta_sq};
pub use summary::{AccuracySummary, CombinationAccuracy, MainEffect};
