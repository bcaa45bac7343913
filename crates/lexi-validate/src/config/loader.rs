//! Configuration loader
//!
//! Merges, in order (later sources override earlier):
//! 1. `EngineConfig::default()`
//! 2. A TOML file (explicit path, else `lexi.toml` in the working directory)
//! 3. Environment variables with the prefix, nested keys split on `__`
//!    (e.g. `LEXI_VALIDATORS__SOURCE_LANGUAGE=en`)

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::path::{Path, PathBuf};

use super::types::EngineConfig;
use crate::logging::{log_config_loaded, parse_log_level};
use crate::validators::ValidatorSettings;
use crate::{Error, Result};

/// Environment variable prefix
pub const CONFIG_ENV_PREFIX: &str = "LEXI";

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILENAME: &str = "lexi.toml";

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    pub fn load(&self) -> Result<EngineConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(EngineConfig::default()));

        match &self.config_path {
            Some(path) if path.exists() => {
                figment = figment.merge(Toml::file(path));
                log_config_loaded(path, true);
            }
            Some(path) => {
                // an explicit path that does not exist is a caller mistake
                log_config_loaded(path, false);
                return Err(Error::config(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    figment = figment.merge(Toml::file(&default_path));
                    log_config_loaded(&default_path, true);
                }
            }
        }

        figment = figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("__"));

        let config: EngineConfig = figment.extract()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Reload configuration (hot-reload)
    pub fn reload(&self) -> Result<EngineConfig> {
        self.load()
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &EngineConfig, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| Error::config(format!("failed to serialize config to TOML: {e}")))?;
        std::fs::write(path.as_ref(), toml_string).map_err(|source| Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

/// Validate configuration values
fn validate_config(config: &EngineConfig) -> Result<()> {
    parse_log_level(&config.logging.level)?;
    if config.validators.max_subsense_depth == 0 {
        return Err(Error::config("validators.max_subsense_depth must be at least 1"));
    }
    ValidatorSettings::from_config(&config.validators)?;
    Ok(())
}
