use regex::Regex;
use serde_json::Value;

use crate::config::ValidatorConfig;
use crate::{Error, Result};

/// Compiled form of [`ValidatorConfig`]
#[derive(Debug, Clone)]
pub struct ValidatorSettings {
    pub source_language: Option<String>,
    pub project_languages: Vec<String>,
    pub pronunciation_languages: Vec<String>,
    /// Anchored date pattern
    pub date_pattern: Regex,
    pub legacy_date_fields: Regex,
    pub max_subsense_depth: usize,
    pub denied_language_codes: Vec<String>,
}

impl ValidatorSettings {
    pub fn from_config(config: &ValidatorConfig) -> Result<Self> {
        let compile = |field: &str, pattern: &str| {
            Regex::new(pattern).map_err(|source| Error::InvalidRegex {
                rule_id: "validators".to_string(),
                field: field.to_string(),
                source,
            })
        };

        Ok(Self {
            source_language: config.source_language.clone(),
            project_languages: config.project_languages.clone(),
            pronunciation_languages: config.pronunciation_languages.clone(),
            date_pattern: compile("date_pattern", &format!("^(?:{})$", config.date_pattern))?,
            legacy_date_fields: compile(
                "legacy_date_field_pattern",
                &config.legacy_date_field_pattern,
            )?,
            max_subsense_depth: config.max_subsense_depth,
            denied_language_codes: config
                .denied_language_codes
                .iter()
                .map(|c| c.to_lowercase())
                .collect(),
        })
    }

    /// Source language of an entry: its own `source_language`, else the project's
    pub fn source_language_for<'a>(&'a self, entry: &'a Value) -> Option<&'a str> {
        entry
            .get("source_language")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .or(self.source_language.as_deref())
    }
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self::from_config(&ValidatorConfig::default()).expect("default patterns are valid")
    }
}
