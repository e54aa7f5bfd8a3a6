//! Deterministic mock gateway for dry runs.
//!
//! Answers correctly with probability `included / total`, where `included`
//! is the number of component texts found in the prompt and `total` the
//! number of components that can be detected at all. A component whose text
//! is nothing but placeholders has no marker and is left out of both counts.
//! Every draw is seeded from the run seed and the
//! request id, so a rerun reproduces the same responses in any order.

use ablation_application::ports::llm_gateway::{CompletionRequest, GatewayError, LlmGateway};
use ablation_domain::{ComponentSet, Problem};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::Duration;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub struct MockLlmGateway {
    /// Literal piece of each detectable component text
    markers: Vec<String>,
    /// Ground-truth answers keyed by problem id
    answers: HashMap<String, String>,
    seed: u64,
    latency: Option<Duration>,
}

impl MockLlmGateway {
    pub fn new(components: &ComponentSet, problems: &[Problem], seed: u64) -> Self {
        Self {
            markers: components
                .iter()
                .map(|c| marker(c.text()))
                .filter(|m| !m.is_empty())
                .collect(),
            answers: problems
                .iter()
                .map(|p| (p.unique_id.clone(), p.answer.clone()))
                .collect(),
            seed,
            latency: None,
        }
    }

    /// Sleep before each response, to exercise concurrency limits.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Probability of a correct answer for this prompt.
    pub fn p_correct(&self, prompt: &str) -> f64 {
        if self.markers.is_empty() {
            return 1.0;
        }
        let found = self
            .markers
            .iter()
            .filter(|m| prompt.contains(m.as_str()))
            .count();
        found as f64 / self.markers.len() as f64
    }

    fn rng_for(&self, request_id: &str) -> StdRng {
        let mut hash = FNV_OFFSET ^ self.seed;
        for byte in request_id.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        StdRng::seed_from_u64(hash)
    }
}

/// First non-empty literal run of a component text, skipping `{placeholders}`.
fn marker(text: &str) -> String {
    let mut pieces = vec![];
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        pieces.push(&rest[..open]);
        rest = match rest[open..].find('}') {
            Some(close) => &rest[open + close + 1..],
            None => "",
        };
    }
    pieces.push(rest);
    pieces
        .into_iter()
        .map(str::trim)
        .find(|p| !p.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl LlmGateway for MockLlmGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let answer = self.answers.get(&request.problem_id).ok_or_else(|| {
            GatewayError::RequestFailed(format!("unknown problem '{}'", request.problem_id))
        })?;

        let p = self.p_correct(&request.prompt).clamp(0.0, 1.0);
        let correct = self.rng_for(&request.request_id).gen_bool(p);
        if correct {
            Ok(format!(
                "Working through the problem step by step.\n<answer>{}</answer>",
                answer
            ))
        } else {
            Ok("I could not solve this one.\n<answer>idk</answer>".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ablation_domain::{PromptComponent, extract_answer};

    fn set() -> ComponentSet {
        ComponentSet::from_components([
            PromptComponent::prefix("Role", "You are an expert."),
            PromptComponent::prefix("Example", "Example problem:\n{example_problem}\nSolution:"),
        ])
        .unwrap()
    }

    fn problems() -> Vec<Problem> {
        vec![Problem::new("test/algebra/1.json", "2+2?", "4")]
    }

    fn request(id: &str, prompt: &str) -> CompletionRequest {
        CompletionRequest {
            request_id: id.to_string(),
            problem_id: "test/algebra/1.json".to_string(),
            prompt: prompt.to_string(),
        }
    }

    #[test]
    fn test_marker_skips_placeholders() {
        assert_eq!(marker("You are an expert."), "You are an expert.");
        assert_eq!(marker("{example_problem}\nSolution: {x}"), "Solution:");
        assert_eq!(marker("Example problem:\n{example_problem}"), "Example problem:");
        assert_eq!(marker("{only}"), "");
    }

    #[test]
    fn test_p_correct_counts_components() {
        let gateway = MockLlmGateway::new(&set(), &problems(), 1);
        assert_eq!(gateway.p_correct("2+2?"), 0.0);
        assert_eq!(gateway.p_correct("You are an expert. 2+2?"), 0.5);
        assert_eq!(
            gateway.p_correct("You are an expert. Example problem:\n1+1\nSolution: 2 2+2?"),
            1.0
        );

        let empty = MockLlmGateway::new(&ComponentSet::empty(), &problems(), 1);
        assert_eq!(empty.p_correct("anything"), 1.0);
    }

    #[test]
    fn test_placeholder_only_component_is_not_counted() {
        let set = ComponentSet::from_components([
            PromptComponent::prefix("Role", "You are an expert."),
            PromptComponent::prefix("Example", "{example_problem}\n{example_solution}"),
        ])
        .unwrap();
        let gateway = MockLlmGateway::new(&set, &problems(), 1);
        assert_eq!(gateway.p_correct("You are an expert. 1+1\n2 2+2?"), 1.0);
        assert_eq!(gateway.p_correct("2+2?"), 0.0);

        let only_placeholders = ComponentSet::from_components([PromptComponent::prefix(
            "Example",
            "{example_problem}",
        )])
        .unwrap();
        let gateway = MockLlmGateway::new(&only_placeholders, &problems(), 1);
        assert_eq!(gateway.p_correct("1+1 2+2?"), 1.0);
    }

    #[tokio::test]
    async fn test_extremes_are_deterministic() {
        let gateway = MockLlmGateway::new(&set(), &problems(), 1);

        let none = gateway.complete(&request("0_1", "2+2?")).await.unwrap();
        assert_eq!(extract_answer(&none), "idk");

        let all = gateway
            .complete(&request(
                "3_1",
                "You are an expert. Example problem:\n1+1\nSolution: 2 2+2?",
            ))
            .await
            .unwrap();
        assert_eq!(extract_answer(&all), "4");
    }

    #[tokio::test]
    async fn test_same_seed_same_responses() {
        let a = MockLlmGateway::new(&set(), &problems(), 7);
        let b = MockLlmGateway::new(&set(), &problems(), 7);
        for i in 0..20 {
            let req = request(&format!("1_{i}"), "You are an expert. 2+2?");
            assert_eq!(a.complete(&req).await.unwrap(), b.complete(&req).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_unknown_problem_fails() {
        let gateway = MockLlmGateway::new(&set(), &problems(), 1);
        let mut req = request("0_9", "x");
        req.problem_id = "missing".to_string();
        assert!(matches!(
            gateway.complete(&req).await,
            Err(GatewayError::RequestFailed(_))
        ));
    }
}
