//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use ablation_domain::config::ENV_PREFIX;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_CONFIG_FILES: [&str; 2] = ["ablation.toml", ".ablation.toml"];
const APP_DIR: &str = "prompt-ablation";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `ABLATION_<SECTION>__<KEY>`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./ablation.toml` or `./.ablation.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/prompt-ablation/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        let global = Self::global_config_path().filter(|p| p.exists());
        let project = Self::project_config_path();
        Self::figment(global.as_deref(), project.as_deref(), config_path)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// File layers without the environment, lowest priority first.
    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));
        for path in [global, project, explicit].into_iter().flatten() {
            figment = figment.merge(Toml::file(path));
        }
        figment
    }

    /// Load from explicit files only (no discovery, no environment).
    pub fn load_files(
        global: Option<&Path>,
        project: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(global, project, explicit)
            .extract()
            .map_err(Box::new)
    }

    /// Get the global config file path
    ///
    /// `$XDG_CONFIG_HOME/prompt-ablation/config.toml` if set, otherwise the
    /// platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Config file locations in priority order, with whether each exists.
    pub fn config_sources(explicit: Option<&Path>) -> Vec<(&'static str, String, bool)> {
        let mut sources = Vec::new();
        if let Some(path) = explicit {
            sources.push(("Explicit", path.display().to_string(), path.exists()));
        }
        match Self::project_config_path() {
            Some(path) => sources.push(("Project", path.display().to_string(), true)),
            None => sources.push(("Project", PROJECT_CONFIG_FILES.join(" or "), false)),
        }
        if let Some(path) = Self::global_config_path() {
            let exists = path.exists();
            sources.push(("Global", path.display().to_string(), exists));
        }
        sources
    }
}
