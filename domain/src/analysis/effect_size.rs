//! Effect sizes for an externally fitted ANOVA table

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the residual row in an ANOVA table.
const RESIDUAL_TERM: &str = "Residual";

/// Conventional partial eta-squared bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectSize {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectSize {
    pub fn classify(partial_eta_sq: f64) -> Self {
        if partial_eta_sq < 0.01 {
            Self::Negligible
        } else if partial_eta_sq < 0.06 {
            Self::Small
        } else if partial_eta_sq < 0.14 {
            Self::Medium
        } else {
            Self::Large
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negligible => "Negligible",
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }
}

impl fmt::Display for EffectSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `ss_effect / (ss_effect + ss_residual)`, or 0 when both are zero.
pub fn partial_eta_sq(ss_effect: f64, ss_residual: f64) -> f64 {
    let denominator = ss_effect + ss_residual;
    if denominator <= 0.0 {
        0.0
    } else {
        ss_effect / denominator
    }
}

/// One row of an ANOVA table as produced by the external engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnovaTerm {
    pub term: String,
    pub sum_sq: f64,
    #[serde(default)]
    pub df: Option<f64>,
    #[serde(default)]
    pub f_value: Option<f64>,
    #[serde(default)]
    pub p_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermEffect {
    pub term: String,
    pub partial_eta_sq: f64,
    pub size: EffectSize,
    pub p_value: Option<f64>,
}

/// Partial eta-squared for every non-residual term.
///
/// Returns `None` if the table has no `Residual` row. The intercept row is
/// skipped.
pub fn effect_sizes(table: &[AnovaTerm]) -> Option<Vec<TermEffect>> {
    let residual = table.iter().find(|t| t.term == RESIDUAL_TERM)?.sum_sq;
    Some(
        table
            .iter()
            .filter(|t| t.term != RESIDUAL_TERM && t.term != "Intercept")
            .map(|t| {
                let eta = partial_eta_sq(t.sum_sq, residual);
                TermEffect {
                    term: t.term.clone(),
                    partial_eta_sq: eta,
                    size: EffectSize::classify(eta),
                    p_value: t.p_value,
                }
            })
            .collect(),
    )
}
