//! Domain layer for prompt-ablation
//!
//! This crate contains the core experiment logic: the component catalog,
//! full-factorial combination enumeration, prompt assembly, answer grading
//! and the analysis export. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Components and combinations
//!
//! A [`ComponentSet`] is the ordered universe of toggleable prompt fragments
//! for one domain. A [`Combination`] switches each of them on or off, and is
//! equivalent to an integer in `[0, 2^N)`: bit `j` (least significant first)
//! is component `j` in registration order.
//!
//! ## Assembly
//!
//! [`PromptAssembler`] places selected prefix fragments before the base
//! problem, suffix fragments after it, and inline fragments right after the
//! problem text.

pub mod analysis;
pub mod combination;
pub mod component;
pub mod config;
pub mod core;
pub mod experiment;
pub mod prompt;

// Re-export commonly used types
pub use analysis::{
    AccuracySummary, AnovaTerm, DesignMatrix, EffectSize, TermEffect, effect_sizes, formula,
    partial_eta_sq,
};
pub use combination::{
    Combination, CombinationGenerator, Combinations, DEFAULT_MAX_COMPONENTS,
    MAX_SUPPORTED_COMPONENTS,
};
pub use component::{ComponentRegistry, ComponentSet, Position, PromptComponent};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::error::DomainError;
pub use experiment::{
    ExperimentRecord, Problem, WorkedExample, extract_answer, grade_answer, request_id,
};
pub use prompt::{PromptAssembler, PromptTemplate, PromptVariant, TemplateValues};
