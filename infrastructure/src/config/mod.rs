//! Configuration file loading for prompt-ablation
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ABLATION_*` environment variables (`__` separates nesting)
//! 2. `--config <path>` specified file
//! 3. Project root: `./ablation.toml` or `./.ablation.toml`
//! 4. Global: `$XDG_CONFIG_HOME/prompt-ablation/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileComponentConfig, FileConfig, FileExperimentConfig, FileLlmConfig, FileOutputConfig,
    FileRunnerConfig, KNOWN_PROVIDERS, default_components, to_component_set,
};
pub use loader::ConfigLoader;
