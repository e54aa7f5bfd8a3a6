//! LLM configuration from TOML (`[llm]` section)

use serde::{Deserialize, Serialize};

/// Providers with a gateway implementation.
pub const KNOWN_PROVIDERS: &[&str] = &["mock"];

/// Raw LLM configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    pub provider: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Seed for deterministic providers
    pub seed: u64,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model: "mock-model".to_string(),
            temperature: 0.0,
            max_tokens: 2048,
            seed: 42,
        }
    }
}

impl FileLlmConfig {
    /// File name of the results for this model and temperature,
    /// e.g. `results_gpt-4o_0.7.jsonl`.
    pub fn results_file_name(&self) -> String {
        let model: String = self
            .model
            .chars()
            .map(|c| if c == '/' || c == ':' { '-' } else { c })
            .collect();
        format!("results_{}_{}.jsonl", model, self.temperature)
    }
}
