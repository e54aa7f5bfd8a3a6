//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable console output
    Text,
    /// JSON output
    Json,
}

impl From<OutputFormat> for ablation_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ablation_domain::OutputFormat::Text,
            OutputFormat::Json => ablation_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for prompt-ablation
#[derive(Parser, Debug)]
#[command(name = "prompt-ablation")]
#[command(author, version, about = "Factorial ablation of prompt components")]
#[command(long_about = r#"
prompt-ablation measures which prompt components matter.

Every combination of the configured components (2^N variants) is applied to
every benchmark problem. Responses are graded, stored as JSONL, and exported
as a design matrix for factorial ANOVA.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./ablation.toml     Project-level config
3. ~/.config/prompt-ablation/config.toml   Global config

Environment variables (ABLATION_RUNNER__CONCURRENCY=8, ...) override files.

Example:
  prompt-ablation components
  prompt-ablation plan --show-prompts --limit 4
  prompt-ablation run --concurrency 8
  prompt-ablation analyze --anova anova.json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format (overrides output.format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the configured components and the number of variants
    Components,

    /// Build the request plan without calling a model
    Plan(PlanArgs),

    /// Run (or resume) the experiment
    Run(RunArgs),

    /// Export the design matrix and summarize stored results
    Analyze(AnalyzeArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Where problems come from
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// Directory holding problems.jsonl and examples.jsonl
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Use only the first N problems
    #[arg(long, value_name = "N")]
    pub limit_problems: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Number of planned requests to list
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Print the full rendered prompts
    #[arg(long)]
    pub show_prompts: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Model name recorded with each result (overrides llm.model)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Seed for the mock provider (overrides llm.seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum in-flight requests (overrides runner.concurrency)
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Directory holding the results file
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Model whose results to analyze (overrides llm.model)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Externally fitted ANOVA table (JSON array of terms)
    #[arg(long, value_name = "PATH")]
    pub anova: Option<PathBuf>,

    /// Highest interaction order to export
    #[arg(long, value_name = "K")]
    pub max_order: Option<usize>,

    /// Skip writing design_matrix.jsonl
    #[arg(long)]
    pub no_export: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
    /// List every configuration key
    Keys,
    /// Validate the configuration
    Check,
    /// Show configuration file locations
    Sources,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_overrides() {
        let cli = Cli::try_parse_from([
            "prompt-ablation",
            "run",
            "--data-dir",
            "bench",
            "--concurrency",
            "8",
            "--seed",
            "7",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.data.data_dir, Some(PathBuf::from("bench")));
                assert_eq!(args.concurrency, Some(8));
                assert_eq!(args.seed, Some(7));
                assert!(args.model.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["prompt-ablation", "plan", "--output", "json", "--no-color"])
                .unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert!(cli.no_color);
        match cli.command {
            Command::Plan(args) => {
                assert_eq!(args.limit, 10);
                assert!(!args.show_prompts);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["prompt-ablation", "config", "check"]).unwrap();
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Check)));

        assert!(Cli::try_parse_from(["prompt-ablation"]).is_err());
        assert!(Cli::try_parse_from(["prompt-ablation", "config", "bogus"]).is_err());
    }

    #[test]
    fn test_output_format_conversion() {
        assert_eq!(
            ablation_domain::OutputFormat::from(OutputFormat::Json),
            ablation_domain::OutputFormat::Json
        );
    }
}
