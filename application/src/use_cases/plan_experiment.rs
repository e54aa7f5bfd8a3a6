//! Plan Experiment use case
//!
//! Crosses every combination of the component set with every problem and
//! renders the final prompt for each pair.

use crate::config::ExperimentParams;
use ablation_domain::prompt::{EXAMPLE_PROBLEM_KEY, EXAMPLE_SOLUTION_KEY, PROBLEM_KEY};
use ablation_domain::{
    Combination, CombinationGenerator, ComponentSet, DomainError, Problem, PromptAssembler,
    PromptTemplate, TemplateValues, WorkedExample, request_id,
};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum PlanExperimentError {
    #[error("No problems to plan")]
    NoProblems,

    #[error("Base template has no {{problem}} placeholder")]
    TemplateMissingProblem,

    #[error("No worked example for subject '{subject}' (needed by request {request_id})")]
    MissingExample { subject: String, request_id: String },

    #[error("Problems '{first}' and '{second}' share the request id suffix '{short_id}'")]
    DuplicateProblemId {
        short_id: String,
        first: String,
        second: String,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// One request of the plan: the fully rendered prompt for a (combination, problem) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRequest {
    pub request_id: String,
    pub problem_id: String,
    pub combination_index: u64,
    pub combination: Combination,
    pub prompt: String,
    pub expected_answer: String,
}

/// Every request of an experiment, in combination-major order.
#[derive(Debug, Clone)]
pub struct ExperimentPlan {
    pub component_set: ComponentSet,
    pub variant_count: u64,
    pub problem_count: usize,
    pub requests: Vec<PlannedRequest>,
}

impl ExperimentPlan {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Input for the PlanExperiment use case
#[derive(Debug, Clone)]
pub struct PlanExperimentInput {
    pub components: ComponentSet,
    pub problems: Vec<Problem>,
    pub examples: Vec<WorkedExample>,
    pub params: ExperimentParams,
}

impl PlanExperimentInput {
    pub fn new(components: ComponentSet, problems: Vec<Problem>) -> Self {
        Self {
            components,
            problems,
            examples: Vec::new(),
            params: ExperimentParams::default(),
        }
    }

    pub fn with_examples(mut self, examples: Vec<WorkedExample>) -> Self {
        self.examples = examples;
        self
    }

    pub fn with_params(mut self, params: ExperimentParams) -> Self {
        self.params = params;
        self
    }
}

/// Use case for building the request plan
pub struct PlanExperimentUseCase;

impl PlanExperimentUseCase {
    pub fn execute(input: &PlanExperimentInput) -> Result<ExperimentPlan, PlanExperimentError> {
        if input.problems.is_empty() {
            return Err(PlanExperimentError::NoProblems);
        }
        if !PromptTemplate::placeholders(&input.params.base_template).contains(&PROBLEM_KEY) {
            return Err(PlanExperimentError::TemplateMissingProblem);
        }
        check_unique_short_ids(&input.problems)?;

        let generator = CombinationGenerator::with_max_components(input.params.max_components);
        let variant_count = generator.variant_count(&input.components)?;
        let assembler = PromptAssembler::with_separator(input.params.separator.clone());

        // First example per subject wins.
        let mut examples_by_subject: HashMap<&str, &WorkedExample> = HashMap::new();
        for example in &input.examples {
            examples_by_subject
                .entry(example.subject.as_str())
                .or_insert(example);
        }

        info!(
            "Planning {} variants x {} problems",
            variant_count,
            input.problems.len()
        );

        let mut requests = Vec::with_capacity(
            usize::try_from(variant_count)
                .unwrap_or(usize::MAX)
                .saturating_mul(input.problems.len())
                .min(1 << 24),
        );

        for (index, combination) in generator.generate(&input.components)?.indexed() {
            let variant =
                assembler.assemble(&input.params.base_template, &combination, &input.components)?;
            let needs_example = PromptTemplate::placeholders(&variant.prompt)
                .iter()
                .any(|key| *key == EXAMPLE_PROBLEM_KEY || *key == EXAMPLE_SOLUTION_KEY);

            for problem in &input.problems {
                let id = request_id(index, problem);
                let mut values = TemplateValues::new().with(PROBLEM_KEY, problem.problem.as_str());

                if needs_example {
                    let subject = problem.subject.as_deref().unwrap_or_default();
                    let example = examples_by_subject.get(subject).ok_or_else(|| {
                        PlanExperimentError::MissingExample {
                            subject: subject.to_string(),
                            request_id: id.clone(),
                        }
                    })?;
                    values = values
                        .with(EXAMPLE_PROBLEM_KEY, example.problem.as_str())
                        .with(EXAMPLE_SOLUTION_KEY, example.solution.as_str());
                }

                requests.push(PlannedRequest {
                    request_id: id,
                    problem_id: problem.unique_id.clone(),
                    combination_index: index,
                    combination: variant.combination.clone(),
                    prompt: PromptTemplate::render(&variant.prompt, &values),
                    expected_answer: problem.answer.clone(),
                });
            }
            debug!("Planned variant {} ({})", index, combination.label());
        }

        Ok(ExperimentPlan {
            component_set: input.components.clone(),
            variant_count,
            problem_count: input.problems.len(),
            requests,
        })
    }
}

/// Request ids are the resume and dedupe key, so two problems must never
/// map to the same suffix.
fn check_unique_short_ids(problems: &[Problem]) -> Result<(), PlanExperimentError> {
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(problems.len());
    for problem in problems {
        let short_id = problem.short_id();
        if let Some(first) = seen.insert(short_id.clone(), problem.unique_id.as_str()) {
            return Err(PlanExperimentError::DuplicateProblemId {
                short_id,
                first: first.to_string(),
                second: problem.unique_id.clone(),
            });
        }
    }
    Ok(())
}
