//! Combination domain
//!
//! Full-factorial enumeration of component on/off assignments.

pub mod generator;
pub mod value_objects;

pub use generator::{
    CombinationGenerator, Combinations, DEFAULT_MAX_COMPONENTS, MAX_SUPPORTED_COMPONENTS,
};
pub use value_objects::Combination;
