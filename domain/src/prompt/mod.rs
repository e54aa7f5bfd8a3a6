//! Prompt domain
//!
//! Turns a (base problem, combination) pair into a submittable prompt, and
//! fills per-problem placeholders into the assembled text.

mod assembler;
mod template;

pub use assembler::{DEFAULT_SEPARATOR, PromptAssembler, PromptVariant, assemble};
pub use template::{
    EXAMPLE_PROBLEM_KEY, EXAMPLE_SOLUTION_KEY, PROBLEM_KEY, PromptTemplate, TemplateValues,
};
