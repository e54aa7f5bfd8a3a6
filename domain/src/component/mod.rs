//! Component domain
//!
//! Prompt components are named fragments of prompt text that can be toggled
//! on or off. A [`ComponentRegistry`] collects them at setup time and freezes
//! into an immutable, ordered [`ComponentSet`].

pub mod entities;
pub mod registry;

pub use entities::{Position, PromptComponent};
pub use registry::{ComponentRegistry, ComponentSet};
