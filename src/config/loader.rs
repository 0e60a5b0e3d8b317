//! Configuration Loader
//!
//! Environment-aware loading: base YAML file, optional environment overlay,
//! then `SNIPPETS__` environment variables.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config, Environment, File};
use tracing::debug;

use super::error::{ConfigResult, ConfigurationError};
use super::SnippetsConfig;
use crate::logging::get_environment;

const BASE_FILE: &str = "snippets.yaml";
const ENV_PREFIX: &str = "SNIPPETS";
const ENV_SEPARATOR: &str = "__";

/// Loaded, validated configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: SnippetsConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = get_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with an explicit environment.
    ///
    /// A missing base file is not an error: defaults plus environment
    /// variables are enough to run.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            environment = %environment,
            directory = %config_directory.display(),
            "Loading configuration"
        );

        let config = Self::build(&config_directory, environment)?;
        config.validate()?;

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    fn build(config_directory: &Path, environment: &str) -> ConfigResult<SnippetsConfig> {
        let defaults = Config::try_from(&SnippetsConfig::default())?;
        let overlay = config_directory
            .join("environments")
            .join(format!("{environment}.yaml"));

        let merged = Config::builder()
            .add_source(defaults)
            .add_source(File::from(config_directory.join(BASE_FILE)).required(false))
            .add_source(File::from(overlay).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        merged
            .try_deserialize::<SnippetsConfig>()
            .map_err(ConfigurationError::from)
    }

    /// Wrap an already-built configuration (tests, embedding)
    pub fn from_config(config: SnippetsConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: get_environment(),
            config_directory: PathBuf::from("config"),
        }))
    }

    pub fn config(&self) -> &SnippetsConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }
}
