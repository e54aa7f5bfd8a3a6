//! Presentation layer for prompt-ablation
//!
//! This crate contains CLI definitions, output formatters,
//! and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{
    AnalyzeArgs, Cli, Command, ConfigCommand, DataArgs, OutputFormat, PlanArgs, RunArgs,
};
pub use output::console::ConsoleFormatter;
pub use output::formatter::{ConfigSource, OutputFormatter, formatter_for};
pub use output::json::JsonFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
