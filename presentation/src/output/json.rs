//! JSON output formatter

use crate::output::formatter::{ConfigSource, OutputFormatter};
use ablation_application::{AnalysisReport, ExperimentPlan, ExperimentSummary};
use ablation_domain::config::ConfigKeyInfo;
use ablation_domain::{ComponentSet, ConfigIssue, Severity};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::Path;

/// Formats command results as pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    fn render<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_components(&self, set: &ComponentSet, variant_count: u64) -> String {
        let components: Vec<Value> = set
            .iter()
            .enumerate()
            .map(|(bit, c)| {
                json!({
                    "bit": bit,
                    "name": c.name(),
                    "position": c.position(),
                    "text": c.text(),
                })
            })
            .collect();
        Self::render(&json!({
            "components": components,
            "variant_count": variant_count,
        }))
    }

    fn format_plan(&self, plan: &ExperimentPlan, limit: usize, show_prompts: bool) -> String {
        let requests: Vec<Value> = plan
            .requests
            .iter()
            .take(limit)
            .map(|r| {
                let mut value = json!({
                    "request_id": r.request_id,
                    "problem_id": r.problem_id,
                    "combination_index": r.combination_index,
                    "combination": r.combination.label(),
                });
                if show_prompts {
                    value["prompt"] = Value::String(r.prompt.clone());
                }
                value
            })
            .collect();
        Self::render(&json!({
            "variant_count": plan.variant_count,
            "problem_count": plan.problem_count,
            "request_count": plan.len(),
            "requests": requests,
        }))
    }

    fn format_run_summary(&self, summary: &ExperimentSummary, results_path: &Path) -> String {
        Self::render(&json!({
            "summary": summary,
            "results_path": results_path.display().to_string(),
        }))
    }

    fn format_analysis(&self, report: &AnalysisReport, export_path: Option<&Path>) -> String {
        Self::render(&json!({
            "formula": report.formula,
            "columns": report.matrix.columns(),
            "rows": report.matrix.rows().len(),
            "design_matrix_path": export_path.map(|p| p.display().to_string()),
            "summary": report.summary,
            "effects": report.effects,
        }))
    }

    fn format_config_issues(&self, issues: &[ConfigIssue]) -> String {
        let issues: Vec<Value> = issues
            .iter()
            .map(|issue| {
                let severity = match issue.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                json!({ "severity": severity, "message": issue.message })
            })
            .collect();
        Self::render(&json!({ "issues": issues }))
    }

    fn format_config_keys(&self, keys: &[ConfigKeyInfo]) -> String {
        let keys: Vec<Value> = keys
            .iter()
            .map(|k| {
                json!({
                    "key": k.key,
                    "description": k.description,
                    "valid_values": k.valid_values,
                    "env": k.env_var(),
                    "cli_flag": k.cli_flag,
                })
            })
            .collect();
        Self::render(&keys)
    }

    fn format_config_sources(&self, sources: &[ConfigSource]) -> String {
        let sources: Vec<Value> = sources
            .iter()
            .map(|(label, path, exists)| json!({ "source": label, "path": path, "exists": exists }))
            .collect();
        Self::render(&sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ablation_domain::PromptComponent;

    #[test]
    fn test_components_json() {
        let set = ComponentSet::from_components([
            PromptComponent::prefix("A", "Expert."),
            PromptComponent::inline("B", "Think."),
        ])
        .unwrap();
        let value: Value = serde_json::from_str(&JsonFormatter.format_components(&set, 4)).unwrap();

        assert_eq!(value["variant_count"], 4);
        assert_eq!(value["components"][1]["bit"], 1);
        assert_eq!(value["components"][1]["name"], "B");
        assert_eq!(value["components"][1]["position"], "inline");
    }

    #[test]
    fn test_run_summary_json() {
        let summary = ExperimentSummary {
            planned: 4,
            completed: 4,
            correct: 2,
            accuracy: 0.5,
            ..Default::default()
        };
        let value: Value = serde_json::from_str(
            &JsonFormatter.format_run_summary(&summary, Path::new("results.jsonl")),
        )
        .unwrap();
        assert_eq!(value["summary"]["accuracy"], 0.5);
        assert_eq!(value["summary"]["cancelled"], false);
        assert_eq!(value["results_path"], "results.jsonl");
    }
}
