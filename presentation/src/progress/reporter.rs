//! Progress reporting for experiment runs

use ablation_application::{ExperimentProgress, ExperimentSummary, TrialStatus};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Reports progress with a single indicatif bar
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
    correct: AtomicUsize,
    failed: AtomicUsize,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            correct: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn message(&self) -> String {
        format!(
            "{} correct, {} failed",
            self.correct.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed)
        )
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperimentProgress for ProgressReporter {
    fn on_run_start(&self, pending: usize, skipped: usize) {
        let bar = ProgressBar::new(pending as u64);
        bar.set_style(Self::bar_style());
        bar.set_prefix("Running");
        if skipped > 0 {
            bar.println(format!(
                "{} {} requests already recorded, resuming",
                "->".cyan(),
                skipped
            ));
        }
        bar.set_message(self.message());

        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn on_request_complete(&self, request_id: &str, status: TrialStatus) {
        match status {
            TrialStatus::Correct => {
                self.correct.fetch_add(1, Ordering::Relaxed);
            }
            TrialStatus::Incorrect => {}
            TrialStatus::Failed => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }

        if let Ok(slot) = self.bar.lock()
            && let Some(bar) = slot.as_ref()
        {
            if status == TrialStatus::Failed {
                bar.println(format!("{} {} failed", "x".red(), request_id));
            }
            bar.set_message(self.message());
            bar.inc(1);
        }
    }

    fn on_run_complete(&self, summary: &ExperimentSummary) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(bar) = slot.take()
        {
            let mark = if summary.cancelled {
                "!".yellow()
            } else {
                "v".green()
            };
            bar.finish_with_message(format!("{} {}", mark, self.message()));
        }
    }
}

/// Line-based progress reporter
///
/// Used alongside verbose logging, where a redrawn bar would interleave with
/// log lines.
pub struct SimpleProgress;

impl SimpleProgress {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SimpleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperimentProgress for SimpleProgress {
    fn on_run_start(&self, pending: usize, skipped: usize) {
        eprintln!(
            "{} {} pending, {} already recorded",
            "Running:".cyan().bold(),
            pending,
            skipped
        );
    }

    fn on_request_complete(&self, request_id: &str, status: TrialStatus) {
        let mark = match status {
            TrialStatus::Correct => "v".green(),
            TrialStatus::Incorrect => "-".dimmed(),
            TrialStatus::Failed => "x".red(),
        };
        eprintln!("  {} {}", mark, request_id);
    }

    fn on_run_complete(&self, summary: &ExperimentSummary) {
        eprintln!(
            "{} {} completed, {} failed",
            "Done:".cyan().bold(),
            summary.completed,
            summary.failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_counts_outcomes() {
        let reporter = ProgressReporter::new();
        reporter.on_run_start(3, 1);
        reporter.on_request_complete("0_1", TrialStatus::Correct);
        reporter.on_request_complete("1_1", TrialStatus::Incorrect);
        reporter.on_request_complete("2_1", TrialStatus::Failed);

        assert_eq!(reporter.message(), "1 correct, 1 failed");
        let position = reporter
            .bar
            .lock()
            .unwrap()
            .as_ref()
            .map(|bar| bar.position());
        assert_eq!(position, Some(3));

        reporter.on_run_complete(&ExperimentSummary::default());
        assert!(reporter.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_complete_before_start_is_ignored() {
        let reporter = ProgressReporter::default();
        reporter.on_request_complete("0_1", TrialStatus::Correct);
        reporter.on_run_complete(&ExperimentSummary::default());
        assert_eq!(reporter.message(), "1 correct, 0 failed");
    }
}
