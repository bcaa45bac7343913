//! Custom Validator Library
//!
//! Hand-written checks too cross-cutting for the generic constraint checker.
//! Rules reach them by name through a `custom` condition; the registry maps
//! names to functions and is fixed before an engine is built, so a rule
//! naming an unregistered validator is rejected at construction.
//!
//! Record fields the built-in validators read:
//!
//! | Level | Fields |
//! |-------|--------|
//! | entry | `id`, `part_of_speech`, `source_language`, `senses`, `relations`, `notes`, `pronunciations` |
//! | sense | `id`, `definition`, `gloss`, `variant_ref`, `is_variant`, `part_of_speech`, `subsenses`, `relations` |
//! | relation | `type`, `ref`, `traits` |

pub mod dates;
pub mod language;
pub mod notes;
pub mod relations;
pub mod senses;
mod settings;

pub use settings::ValidatorSettings;

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::RuleError;
use crate::path::{PathMatch, last_key};
use crate::result::{Finding, render_template, value_text};
use crate::rules::Rule;

/// Everything a custom validator gets to look at
#[derive(Debug, Clone, Copy)]
pub struct CustomCheck<'a> {
    /// The whole entry, not just the matched subtree
    pub record: &'a Value,
    /// The rule being applied
    pub rule: &'a Rule,
    /// Raw matches of the rule's path
    pub matches: &'a [PathMatch<'a>],
    pub settings: &'a ValidatorSettings,
}

impl<'a> CustomCheck<'a> {
    /// The entry as a mapping, `None` for non-mapping records
    pub fn entry(&self) -> Option<&'a Map<String, Value>> {
        self.record.as_object()
    }

    pub fn entry_id(&self) -> Option<&'a str> {
        self.record.get("id").and_then(Value::as_str)
    }

    /// Finding rendered from the rule's message template
    pub fn finding(&self, path: &str, value: &Value, detail: &str) -> Finding {
        let value_text = value_text(value);
        let message = render_template(
            &self.rule.message_template,
            &[
                ("value", value_text.as_str()),
                ("key", last_key(path)),
                ("path", path),
                ("detail", detail),
            ],
        );
        Finding::from_rule(self.rule, message, path, value.clone())
    }

    /// Finding with a message of the validator's own
    pub fn finding_with_message(&self, path: &str, message: String, value: &Value) -> Finding {
        Finding::from_rule(self.rule, message, path, value.clone())
    }
}

/// Signature shared by every custom validator
pub type CustomValidatorFn =
    dyn Fn(&CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> + Send + Sync;

/// Name → validator registry
#[derive(Clone, Default)]
pub struct CustomValidatorRegistry {
    validators: HashMap<String, Arc<CustomValidatorFn>>,
}

impl CustomValidatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in validator
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("sense_content_or_variant", senses::sense_content_or_variant);
        registry.register(
            "sense_required_unless_variant",
            senses::sense_required_unless_variant,
        );
        registry.register("definition_non_empty", senses::definition_non_empty);
        registry.register("subsense_depth", senses::subsense_depth);
        registry.register("pos_consistency", senses::pos_consistency);
        registry.register(
            "conflicting_pos_requires_entry_pos",
            senses::conflicting_pos_requires_entry_pos,
        );
        registry.register("unique_note_types", notes::unique_note_types);
        registry.register("non_empty_simple_notes", notes::non_empty_simple_notes);
        registry.register("note_languages", notes::note_languages);
        registry.register(
            "synonym_antonym_exclusion",
            relations::synonym_antonym_exclusion,
        );
        registry.register(
            "circular_component_reference",
            relations::circular_component_reference,
        );
        registry.register(
            "circular_sense_reference",
            relations::circular_sense_reference,
        );
        registry.register(
            "circular_entry_reference",
            relations::circular_entry_reference,
        );
        registry.register("language_codes", language::language_codes);
        registry.register("pronunciation_languages", language::pronunciation_languages);
        registry.register("date_fields", dates::date_fields);
        registry
    }

    /// Add or replace a validator
    pub fn register<F>(&mut self, name: impl Into<String>, validator: F)
    where
        F: Fn(&CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> + Send + Sync + 'static,
    {
        self.validators.insert(name.into(), Arc::new(validator));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<CustomValidatorFn>> {
        self.validators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl fmt::Debug for CustomValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValidatorRegistry")
            .field("validators", &self.names())
            .finish()
    }
}

/// Text of a multilingual value: a plain string or `{ "text": ... }`
pub(crate) fn text_of(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(obj) => obj.get("text").and_then(Value::as_str),
        _ => None,
    }
}

/// Whether a multilingual mapping holds any non-blank text
pub(crate) fn has_text(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_object)
        .is_some_and(|forms| {
            forms
                .values()
                .filter_map(text_of)
                .any(|t| !t.trim().is_empty())
        })
}

/// Non-blank string field of a mapping
pub(crate) fn non_blank<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
