//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ISO-8601 calendar date, optionally followed by a time and offset
pub const DEFAULT_DATE_PATTERN: &str =
    r"\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?";

/// Legacy numbered date custom fields (`date1`, `custom_date_2`, ...)
pub const DEFAULT_LEGACY_DATE_FIELD_PATTERN: &str = r"(?i)^(?:custom[-_]?)?date[-_]?\d+$";

pub const DEFAULT_MAX_SUBSENSE_DEPTH: usize = 3;

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rule document or directory; the built-in rule set when absent
    pub rules_path: Option<PathBuf>,
    /// Default for restricting passes to client-visible rules
    pub client_visible_only: bool,
    pub validators: ValidatorConfig,
    pub logging: LoggingConfig,
}

/// Project settings consumed by the custom validators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Source language whose definitions may be left empty
    pub source_language: Option<String>,
    /// Allow-list for multilingual note languages (empty: format check only)
    pub project_languages: Vec<String>,
    /// Allow-list for pronunciation writing systems (empty: format check only)
    pub pronunciation_languages: Vec<String>,
    /// Full-match pattern for date-valued fields
    pub date_pattern: String,
    /// Field names exempt from the date check
    pub legacy_date_field_pattern: String,
    pub max_subsense_depth: usize,
    /// Codes rejected even though they are well-formed
    pub denied_language_codes: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            source_language: None,
            project_languages: Vec::new(),
            pronunciation_languages: Vec::new(),
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
            legacy_date_field_pattern: DEFAULT_LEGACY_DATE_FIELD_PATTERN.to_string(),
            max_subsense_depth: DEFAULT_MAX_SUBSENSE_DEPTH,
            denied_language_codes: vec!["ipa".to_string()],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}
