//! Configuration Module
//!
//! Engine configuration and its layered loader (defaults, `lexi.toml`,
//! `LEXI_*` environment variables).

mod loader;
mod types;

pub use loader::{CONFIG_ENV_PREFIX, ConfigLoader, DEFAULT_CONFIG_FILENAME};
pub use types::{
    DEFAULT_DATE_PATTERN, DEFAULT_LEGACY_DATE_FIELD_PATTERN, DEFAULT_MAX_SUBSENSE_DEPTH,
    EngineConfig, LoggingConfig, ValidatorConfig,
};
