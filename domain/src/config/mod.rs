//! Configuration value objects shared across layers

pub mod config_key;
mod output_format;
pub mod validation;

pub use config_key::{ConfigKeyInfo, ENV_PREFIX, known_keys, lookup_key};
pub use output_format::OutputFormat;
pub use validation::{ConfigIssue, ConfigIssueCode, Severity, has_errors};
