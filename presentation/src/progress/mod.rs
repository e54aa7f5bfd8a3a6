//! Progress reporters for experiment runs

pub mod reporter;
