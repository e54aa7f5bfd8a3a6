//! Output formatter trait

use ablation_application::{AnalysisReport, ExperimentPlan, ExperimentSummary};
use ablation_domain::config::ConfigKeyInfo;
use ablation_domain::{ComponentSet, ConfigIssue, OutputFormat};
use std::path::Path;

/// A configuration source: label, path, and whether the file exists.
pub type ConfigSource = (&'static str, String, bool);

/// Renders command results for the terminal
pub trait OutputFormatter {
    /// Registered components in bit order, with the variant count
    fn format_components(&self, set: &ComponentSet, variant_count: u64) -> String;

    /// Plan overview plus the first `limit` requests
    fn format_plan(&self, plan: &ExperimentPlan, limit: usize, show_prompts: bool) -> String;

    fn format_run_summary(&self, summary: &ExperimentSummary, results_path: &Path) -> String;

    /// Analysis report; `export_path` is where the design matrix was written
    fn format_analysis(&self, report: &AnalysisReport, export_path: Option<&Path>) -> String;

    fn format_config_issues(&self, issues: &[ConfigIssue]) -> String;

    fn format_config_keys(&self, keys: &[ConfigKeyInfo]) -> String;

    fn format_config_sources(&self, sources: &[ConfigSource]) -> String;
}

/// Pick the formatter for an output format.
pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(crate::output::console::ConsoleFormatter),
        OutputFormat::Json => Box::new(crate::output::json::JsonFormatter),
    }
}
