//! Registry of configuration keys.
//!
//! Backs the `config keys` command: every dotted key the loader reads, what
//! it does, its accepted values and the environment variable that sets it.

/// Prefix of every configuration environment variable.
pub const ENV_PREFIX: &str = "ABLATION_";

/// Metadata for a single config key.
#[derive(Debug, Clone)]
pub struct ConfigKeyInfo {
    /// Dotted key path (e.g., `"runner.concurrency"`).
    pub key: &'static str,
    pub description: &'static str,
    /// Valid string values (empty if freeform).
    pub valid_values: &'static [&'static str],
    /// Command-line flag that overrides the key, if any.
    pub cli_flag: Option<&'static str>,
}

impl ConfigKeyInfo {
    /// Environment variable for this key, e.g. `ABLATION_RUNNER__CONCURRENCY`.
    pub fn env_var(&self) -> String {
        format!("{}{}", ENV_PREFIX, self.key.replace('.', "__").to_uppercase())
    }
}

pub fn known_keys() -> &'static [ConfigKeyInfo] {
    &KNOWN_KEYS
}

/// Look up a config key by its dotted path.
pub fn lookup_key(key: &str) -> Option<&'static ConfigKeyInfo> {
    KNOWN_KEYS.iter().find(|k| k.key == key)
}

static KNOWN_KEYS: [ConfigKeyInfo; 16] = [
    // ==================== experiment ====================
    ConfigKeyInfo {
        key: "experiment.name",
        description: "Experiment name used in output file names",
        valid_values: &[],
        cli_flag: None,
    },
    ConfigKeyInfo {
        key: "experiment.data_dir",
        description: "Directory holding problems.jsonl, examples.jsonl and results",
        valid_values: &[],
        cli_flag: Some("--data-dir"),
    },
    ConfigKeyInfo {
        key: "experiment.max_components",
        description: "Safety ceiling on the number of toggleable components",
        valid_values: &[],
        cli_flag: None,
    },
    ConfigKeyInfo {
        key: "experiment.separator",
        description: "Text placed between assembled prompt blocks",
        valid_values: &[],
        cli_flag: None,
    },
    ConfigKeyInfo {
        key: "experiment.max_interaction_order",
        description: "Highest interaction order in the exported design matrix",
        valid_values: &[],
        cli_flag: None,
    },
    // ==================== llm ====================
    ConfigKeyInfo {
        key: "llm.provider",
        description: "Gateway used to answer prompts",
        valid_values: &["mock"],
        cli_flag: None,
    },
    ConfigKeyInfo {
        key: "llm.model",
        description: "Model name recorded with every result",
        valid_values: &[],
        cli_flag: Some("--model"),
    },
    ConfigKeyInfo {
        key: "llm.temperature",
        description: "Sampling temperature",
        valid_values: &[],
        cli_flag: None,
    },
    ConfigKeyInfo {
        key: "llm.max_tokens",
        description: "Maximum completion length",
        valid_values: &[],
        cli_flag: None,
    },
    ConfigKeyInfo {
        key: "llm.seed",
        description: "Seed for the mock gateway",
        valid_values: &[],
        cli_flag: Some("--seed"),
    },
    // ==================== runner ====================
    ConfigKeyInfo {
        key: "runner.concurrency",
        description: "Maximum in-flight requests",
        valid_values: &[],
        cli_flag: Some("--concurrency"),
    },
    ConfigKeyInfo {
        key: "runner.max_retries",
        description: "Retries for connection, timeout and rate-limit errors",
        valid_values: &[],
        cli_flag: None,
    },
    ConfigKeyInfo {
        key: "runner.retry_backoff_ms",
        description: "Initial retry delay, doubled per attempt",
        valid_values: &[],
        cli_flag: None,
    },
    ConfigKeyInfo {
        key: "runner.timeout_secs",
        description: "Per-request timeout",
        valid_values: &[],
        cli_flag: None,
    },
    // ==================== output ====================
    ConfigKeyInfo {
        key: "output.format",
        description: "Console output format",
        valid_values: &["text", "json"],
        cli_flag: Some("--output"),
    },
    ConfigKeyInfo {
        key: "output.color",
        description: "Colored console output",
        valid_values: &["true", "false"],
        cli_flag: Some("--no-color"),
    },
];
