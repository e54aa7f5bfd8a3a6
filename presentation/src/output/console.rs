//! Console output formatter

use crate::output::formatter::{ConfigSource, OutputFormatter};
use ablation_application::{AnalysisReport, ExperimentPlan, ExperimentSummary};
use ablation_domain::config::ConfigKeyInfo;
use ablation_domain::{ComponentSet, ConfigIssue, Severity};
use colored::Colorize;
use std::path::Path;

/// Formats command results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}\n", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn percent(value: f64) -> String {
        format!("{:.1}%", value * 100.0)
    }

    fn signed_points(delta: f64) -> String {
        let text = format!("{:+.1} pts", delta * 100.0);
        if delta > 0.0 {
            text.green().to_string()
        } else if delta < 0.0 {
            text.red().to_string()
        } else {
            text
        }
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_components(&self, set: &ComponentSet, variant_count: u64) -> String {
        let mut output = Self::header("Prompt Components");

        if set.is_empty() {
            output.push_str(&format!("\n{}\n", "No components configured.".yellow()));
        }
        for (bit, component) in set.iter().enumerate() {
            output.push_str(&format!(
                "\n{} {} {}\n{}\n",
                format!("[bit {}]", bit).dimmed(),
                component.name().yellow().bold(),
                format!("({})", component.position().as_str()).dimmed(),
                Self::indent(component.text(), "    ")
            ));
        }

        output.push_str(&format!(
            "\n{} {} components, {} variants\n",
            "Total:".cyan().bold(),
            set.len(),
            variant_count
        ));
        output
    }

    fn format_plan(&self, plan: &ExperimentPlan, limit: usize, show_prompts: bool) -> String {
        let mut output = Self::header("Experiment Plan");

        output.push_str(&format!(
            "\n{} {} variants x {} problems = {} requests\n",
            "Plan:".cyan().bold(),
            plan.variant_count,
            plan.problem_count,
            plan.len()
        ));

        output.push_str(&Self::section_header("Requests"));
        for request in plan.requests.iter().take(limit) {
            output.push_str(&format!(
                "{:<28} {}\n",
                request.request_id.yellow(),
                request.combination.label()
            ));
            if show_prompts {
                output.push_str(&Self::indent(&request.prompt, "    | "));
                output.push_str("\n\n");
            }
        }
        if plan.len() > limit {
            output.push_str(&format!(
                "{}\n",
                format!("... and {} more", plan.len() - limit).dimmed()
            ));
        }
        output
    }

    fn format_run_summary(&self, summary: &ExperimentSummary, results_path: &Path) -> String {
        let mut output = Self::header("Run Summary");

        output.push_str(&format!("\n{:<12} {}\n", "Planned:".cyan().bold(), summary.planned));
        output.push_str(&format!("{:<12} {}\n", "Skipped:".cyan().bold(), summary.skipped));
        output.push_str(&format!(
            "{:<12} {}\n",
            "Completed:".cyan().bold(),
            summary.completed
        ));
        let failed = if summary.failed > 0 {
            summary.failed.to_string().red().to_string()
        } else {
            summary.failed.to_string()
        };
        output.push_str(&format!("{:<12} {}\n", "Failed:".cyan().bold(), failed));
        output.push_str(&format!(
            "{:<12} {} ({} correct)\n",
            "Accuracy:".cyan().bold(),
            Self::percent(summary.accuracy),
            summary.correct
        ));

        if summary.cancelled {
            output.push_str(&format!(
                "\n{}\n",
                "Run cancelled. Re-run the same command to resume.".yellow()
            ));
        }
        output.push_str(&format!(
            "\n{} {}\n",
            "Results:".dimmed(),
            results_path.display()
        ));
        output
    }

    fn format_analysis(&self, report: &AnalysisReport, export_path: Option<&Path>) -> String {
        let summary = &report.summary;
        let mut output = Self::header("Ablation Analysis");

        output.push_str(&format!("\n{} {}\n", "Formula:".cyan().bold(), report.formula));
        output.push_str(&format!(
            "{} {} rows x {} columns\n",
            "Design matrix:".cyan().bold(),
            report.matrix.rows().len(),
            report.matrix.columns().len()
        ));
        if let Some(path) = export_path {
            output.push_str(&format!("{} {}\n", "Exported to:".dimmed(), path.display()));
        }
        output.push_str(&format!(
            "{} {} ({}/{})\n",
            "Overall accuracy:".cyan().bold(),
            Self::percent(summary.accuracy),
            summary.correct,
            summary.trials
        ));

        output.push_str(&Self::section_header("Accuracy by Combination"));
        let best = summary.best().map(|b| b.index);
        for combination in &summary.combinations {
            let line = format!(
                "{:>4}  {:>7}  {:>5}  {}",
                combination.index,
                Self::percent(combination.accuracy),
                combination.trials,
                combination.label
            );
            if Some(combination.index) == best {
                output.push_str(&format!("{} {}\n", line.green().bold(), "(best)".green()));
            } else {
                output.push_str(&format!("{}\n", line));
            }
        }

        if !summary.main_effects.is_empty() {
            output.push_str(&Self::section_header("Main Effects"));
            for effect in &summary.main_effects {
                output.push_str(&format!(
                    "{:<24} {}  (with {}, without {})\n",
                    effect.component.yellow(),
                    Self::signed_points(effect.delta),
                    Self::percent(effect.accuracy_with),
                    Self::percent(effect.accuracy_without)
                ));
            }
        }

        if let Some(effects) = &report.effects {
            output.push_str(&Self::section_header("Effect Sizes (partial eta squared)"));
            for effect in effects {
                let p = effect
                    .p_value
                    .map(|p| format!("p = {:.4}", p))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "{:<40} {:>8.4}  {:<10} {}\n",
                    effect.term,
                    effect.partial_eta_sq,
                    effect.size.as_str(),
                    p.dimmed()
                ));
            }
        }

        output
    }

    fn format_config_issues(&self, issues: &[ConfigIssue]) -> String {
        if issues.is_empty() {
            return format!("{} configuration is valid\n", "v".green());
        }

        let mut output = String::new();
        for issue in issues {
            let label = match issue.severity {
                Severity::Error => "error:".red().bold(),
                Severity::Warning => "warning:".yellow().bold(),
            };
            output.push_str(&format!("{} {}\n", label, issue.message));
        }
        output
    }

    fn format_config_keys(&self, keys: &[ConfigKeyInfo]) -> String {
        let mut output = Self::header("Configuration Keys");
        output.push('\n');

        for key in keys {
            output.push_str(&format!("{}\n", key.key.yellow().bold()));
            output.push_str(&format!("    {}\n", key.description));
            if !key.valid_values.is_empty() {
                output.push_str(&format!(
                    "    {} {}\n",
                    "values:".dimmed(),
                    key.valid_values.join(", ")
                ));
            }
            output.push_str(&format!("    {} {}\n", "env:".dimmed(), key.env_var()));
            if let Some(flag) = key.cli_flag {
                output.push_str(&format!("    {} {}\n", "flag:".dimmed(), flag));
            }
        }
        output
    }

    fn format_config_sources(&self, sources: &[ConfigSource]) -> String {
        let mut output = format!("{}\n", "Configuration sources (highest priority first):".bold());

        for (label, path, exists) in sources {
            let status = if *exists {
                "found".green()
            } else {
                "not found".dimmed()
            };
            output.push_str(&format!("  {:<10} {} ({})\n", label, path, status));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ablation_domain::{ConfigIssueCode, PromptComponent};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_components_lists_bits() {
        plain();
        let set = ComponentSet::from_components([
            PromptComponent::prefix("Role_Assignment", "You are an expert."),
            PromptComponent::suffix("Self_Verification", "Check your work."),
        ])
        .unwrap();

        let output = ConsoleFormatter.format_components(&set, 4);
        assert!(output.contains("[bit 0] Role_Assignment (prefix)"));
        assert!(output.contains("[bit 1] Self_Verification (suffix)"));
        assert!(output.contains("2 components, 4 variants"));
    }

    #[test]
    fn test_format_config_issues() {
        plain();
        assert!(ConsoleFormatter.format_config_issues(&[]).contains("valid"));

        let issues = vec![
            ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "runner.concurrency".into(),
                },
                "runner.concurrency must be at least 1",
            ),
            ConfigIssue::warning(ConfigIssueCode::NoComponents, "no components configured"),
        ];
        let output = ConsoleFormatter.format_config_issues(&issues);
        assert!(output.contains("error: runner.concurrency must be at least 1"));
        assert!(output.contains("warning: no components configured"));
    }

    #[test]
    fn test_format_run_summary_cancelled() {
        plain();
        let summary = ExperimentSummary {
            planned: 10,
            skipped: 2,
            completed: 4,
            failed: 1,
            correct: 3,
            accuracy: 0.75,
            cancelled: true,
        };
        let output = ConsoleFormatter.format_run_summary(&summary, Path::new("data/results.jsonl"));
        assert!(output.contains("75.0%"));
        assert!(output.contains("resume"));
        assert!(output.contains("data/results.jsonl"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
