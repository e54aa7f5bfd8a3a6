//! CLI entrypoint for prompt-ablation
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use ablation_application::{
    AnalyzeResultsInput, AnalyzeResultsUseCase, ExperimentPlan, PlanExperimentInput,
    PlanExperimentUseCase, ResultsStore, RunExperimentInput, RunExperimentUseCase,
};
use ablation_domain::config::{has_errors, known_keys};
use ablation_domain::{
    AnovaTerm, CombinationGenerator, ComponentSet, OutputFormat, Problem, Severity, WorkedExample,
};
use ablation_infrastructure::{
    ConfigLoader, FileConfig, JsonlResultsStore, MockLlmGateway, load_examples, load_problems,
    write_design_matrix, write_json,
};
use ablation_presentation::{
    AnalyzeArgs, Cli, Command, ConfigCommand, DataArgs, OutputFormatter, PlanArgs,
    ProgressReporter, RunArgs, SimpleProgress, formatter_for,
};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting prompt-ablation");

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    apply_overrides(&mut config, &cli.command);

    let format = cli
        .output
        .map(OutputFormat::from)
        .unwrap_or(config.output.format);
    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }
    let formatter = formatter_for(format);

    if let Command::Config(command) = &cli.command {
        return run_config_command(*command, &cli, &config, format, formatter.as_ref());
    }

    let issues = config.validate();
    if has_errors(&issues) {
        eprint!("{}", formatter.format_config_issues(&issues));
        bail!("Invalid configuration");
    }
    for issue in issues.iter().filter(|i| i.severity == Severity::Warning) {
        warn!("{}", issue.message);
    }

    let components = config
        .component_set()
        .context("Invalid component catalog")?;

    match &cli.command {
        Command::Components => {
            let variant_count = CombinationGenerator::with_max_components(
                config.experiment.max_components,
            )
            .variant_count(&components)?;
            println!(
                "{}",
                formatter.format_components(&components, variant_count)
            );
        }
        Command::Plan(args) => run_plan(args, &config, components, formatter.as_ref())?,
        Command::Run(args) => {
            let show_progress = !cli.quiet && format == OutputFormat::Text;
            run_experiment(
                args,
                &config,
                components,
                show_progress,
                cli.verbose,
                formatter.as_ref(),
            )
            .await?
        }
        Command::Analyze(args) => run_analyze(args, &config, components, formatter.as_ref())?,
        Command::Config(_) => unreachable!("handled above"),
    }

    Ok(())
}

/// Console logging at the `-v` level, plus an optional plain-text file layer.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("--log-file must name a file: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Command-line flags take precedence over every configuration source.
fn apply_overrides(config: &mut FileConfig, command: &Command) {
    fn apply_data(config: &mut FileConfig, data: &DataArgs) {
        if let Some(dir) = &data.data_dir {
            config.experiment.data_dir = dir.clone();
        }
    }

    match command {
        Command::Plan(args) => apply_data(config, &args.data),
        Command::Run(args) => {
            apply_data(config, &args.data);
            if let Some(model) = &args.model {
                config.llm.model = model.clone();
            }
            if let Some(seed) = args.seed {
                config.llm.seed = seed;
            }
            if let Some(concurrency) = args.concurrency {
                config.runner.concurrency = concurrency;
            }
        }
        Command::Analyze(args) => {
            if let Some(dir) = &args.data_dir {
                config.experiment.data_dir = dir.clone();
            }
            if let Some(model) = &args.model {
                config.llm.model = model.clone();
            }
            if let Some(order) = args.max_order {
                config.experiment.max_interaction_order = Some(order);
            }
        }
        Command::Components | Command::Config(_) => {}
    }
}

fn run_config_command(
    command: ConfigCommand,
    cli: &Cli,
    config: &FileConfig,
    format: OutputFormat,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let rendered = match format {
                OutputFormat::Text => toml::to_string_pretty(config)?,
                OutputFormat::Json => serde_json::to_string_pretty(config)?,
            };
            println!("{}", rendered);
        }
        ConfigCommand::Keys => println!("{}", formatter.format_config_keys(known_keys())),
        ConfigCommand::Check => {
            let issues = config.validate();
            print!("{}", formatter.format_config_issues(&issues));
            if format == OutputFormat::Json {
                println!();
            }
            if has_errors(&issues) {
                bail!("Invalid configuration");
            }
        }
        ConfigCommand::Sources => {
            let sources = ConfigLoader::config_sources(cli.config.as_deref());
            print!("{}", formatter.format_config_sources(&sources));
            if format == OutputFormat::Json {
                println!();
            }
        }
    }
    Ok(())
}

fn load_dataset(
    config: &FileConfig,
    data: &DataArgs,
) -> Result<(Vec<Problem>, Vec<WorkedExample>)> {
    let mut problems = load_problems(&config.experiment.problems_path())?;
    if let Some(limit) = data.limit_problems {
        problems.truncate(limit);
    }
    let examples = load_examples(&config.experiment.examples_path())?;
    info!(
        "Loaded {} problems and {} worked examples from {}",
        problems.len(),
        examples.len(),
        config.experiment.data_dir.display()
    );
    Ok((problems, examples))
}

fn build_plan(
    config: &FileConfig,
    components: ComponentSet,
    problems: Vec<Problem>,
    examples: Vec<WorkedExample>,
) -> Result<ExperimentPlan> {
    let input = PlanExperimentInput::new(components, problems)
        .with_examples(examples)
        .with_params(config.experiment_params());
    Ok(PlanExperimentUseCase::execute(&input)?)
}

fn results_path(config: &FileConfig) -> PathBuf {
    config
        .experiment
        .data_dir
        .join(config.llm.results_file_name())
}

fn run_plan(
    args: &PlanArgs,
    config: &FileConfig,
    components: ComponentSet,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let (problems, examples) = load_dataset(config, &args.data)?;
    let plan = build_plan(config, components, problems, examples)?;
    println!(
        "{}",
        formatter.format_plan(&plan, args.limit, args.show_prompts)
    );
    Ok(())
}

async fn run_experiment(
    args: &RunArgs,
    config: &FileConfig,
    components: ComponentSet,
    show_progress: bool,
    verbose: u8,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let (problems, examples) = load_dataset(config, &args.data)?;

    // === Dependency Injection ===
    let gateway = match config.llm.provider.as_str() {
        "mock" => Arc::new(MockLlmGateway::new(&components, &problems, config.llm.seed)),
        other => bail!("Unsupported provider '{}'", other),
    };
    let results_path = results_path(config);
    let store = Arc::new(
        JsonlResultsStore::open(&results_path)
            .with_context(|| format!("Cannot open {}", results_path.display()))?,
    );

    let plan = build_plan(config, components, problems, examples)?;
    info!(
        "Running {} requests against {} ({})",
        plan.len(),
        config.llm.model,
        config.llm.provider
    );

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing in-flight requests");
            ctrl_c_token.cancel();
        }
    });

    let use_case = RunExperimentUseCase::new(gateway, Arc::clone(&store))
        .with_params(config.runner.to_params())
        .with_cancellation(token);
    let input = RunExperimentInput::new(plan.requests, config.llm.model.clone());

    let summary = if !show_progress {
        use_case.execute(input).await?
    } else if verbose > 0 {
        use_case
            .execute_with_progress(input, &SimpleProgress::new())
            .await?
    } else {
        use_case
            .execute_with_progress(input, &ProgressReporter::new())
            .await?
    };
    store.flush()?;

    println!("{}", formatter.format_run_summary(&summary, &results_path));
    Ok(())
}

fn run_analyze(
    args: &AnalyzeArgs,
    config: &FileConfig,
    components: ComponentSet,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let anova = match &args.anova {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Cannot read {}", path.display()))?;
            let table: Vec<AnovaTerm> = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Invalid ANOVA table in {}", path.display()))?;
            Some(table)
        }
        None => None,
    };

    let results_path = results_path(config);
    let store = Arc::new(
        JsonlResultsStore::open_existing(&results_path)
            .context("Run `prompt-ablation run` with the same model and seed first")?,
    );
    let input = AnalyzeResultsInput {
        components,
        max_interaction_order: config.experiment.max_interaction_order,
        anova,
    };
    let report = AnalyzeResultsUseCase::new(store).execute(&input)?;

    let export_path = if args.no_export {
        None
    } else {
        let matrix_path = config.experiment.design_matrix_path();
        write_design_matrix(&matrix_path, &report.matrix)
            .with_context(|| format!("Cannot write {}", matrix_path.display()))?;
        let summary_path = config.experiment.summary_path();
        write_json(&summary_path, &report.summary)
            .with_context(|| format!("Cannot write {}", summary_path.display()))?;
        info!("Exported design matrix to {}", matrix_path.display());
        Some(matrix_path)
    };

    println!(
        "{}",
        formatter.format_analysis(&report, export_path.as_deref())
    );
    Ok(())
}
