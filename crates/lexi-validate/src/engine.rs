//! Rule Application Engine
//!
//! Applies every enabled rule of a [`RuleRepository`] to a record and folds
//! the findings into a [`ValidationResult`]. Rules are applied in repository
//! order; each one runs behind its own recovery boundary, so a rule that
//! fails (bad path, failing or panicking custom validator) is reported as a
//! single critical finding and the pass carries on.

use arc_swap::ArcSwap;
use rayon::prelude::*;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::constraint;
use crate::error::RuleError;
use crate::path::{PathEvaluator, PathExpr, PathMatch, Segment, last_key, push_field};
use crate::result::{Finding, ValidationResult, render_template, value_text};
use crate::rules::{Condition, Priority, Rule, RuleRepository, ValidationMode};
use crate::validators::{CustomCheck, CustomValidatorRegistry, ValidatorSettings};
use crate::{Error, Result};

/// Text substituted for `{value}` when a required value is absent
const MISSING_VALUE: &str = "(missing)";

/// Per-pass options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationOptions {
    pub mode: ValidationMode,
    /// Skip rules not marked `client_visible`
    pub client_visible_only: bool,
}

impl ValidationOptions {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            client_visible_only: false,
        }
    }

    pub fn client_visible_only(mut self, only: bool) -> Self {
        self.client_visible_only = only;
        self
    }
}

/// Validation engine
///
/// Holds the rule set behind an [`ArcSwap`] so it can be replaced while
/// passes are running; a pass keeps the snapshot it started with.
#[derive(Debug)]
pub struct ValidationEngine {
    rules: ArcSwap<RuleRepository>,
    validators: CustomValidatorRegistry,
    evaluator: PathEvaluator,
    settings: ValidatorSettings,
    client_visible_only: bool,
}

impl ValidationEngine {
    /// Engine with the built-in validators and default settings
    pub fn new(rules: RuleRepository) -> Result<Self> {
        Self::with_parts(
            rules,
            CustomValidatorRegistry::builtin(),
            ValidatorSettings::default(),
        )
    }

    /// Engine from explicit parts
    ///
    /// Fails if a rule names a custom validator missing from `validators`.
    pub fn with_parts(
        rules: RuleRepository,
        validators: CustomValidatorRegistry,
        settings: ValidatorSettings,
    ) -> Result<Self> {
        check_custom_functions(&rules, &validators)?;
        Ok(Self {
            rules: ArcSwap::from_pointee(rules),
            validators,
            evaluator: PathEvaluator::new(),
            settings,
            client_visible_only: false,
        })
    }

    /// Engine described by a loaded configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let rules = match &config.rules_path {
            Some(path) => RuleRepository::load(path)?,
            None => RuleRepository::builtin()?,
        };
        let settings = ValidatorSettings::from_config(&config.validators)?;
        Ok(Self::with_parts(rules, CustomValidatorRegistry::builtin(), settings)?
            .with_client_visible_only(config.client_visible_only))
    }

    /// Default client-visibility restriction for [`validate_record`](Self::validate_record)
    pub fn with_client_visible_only(mut self, only: bool) -> Self {
        self.client_visible_only = only;
        self
    }

    /// Replace the rule set; passes already running finish on the old one
    pub fn reload_rules(&self, rules: RuleRepository) -> Result<()> {
        check_custom_functions(&rules, &self.validators)?;
        let count = rules.len();
        let source = rules.source().to_string();
        self.rules.store(Arc::new(rules));
        info!(rules = count, source = %source, "Rule set reloaded");
        Ok(())
    }

    /// Current rule set snapshot
    pub fn rules(&self) -> Arc<RuleRepository> {
        self.rules.load_full()
    }

    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    pub fn validators(&self) -> &CustomValidatorRegistry {
        &self.validators
    }

    /// Validate one record in `mode`
    pub fn validate_record(&self, record: &Value, mode: ValidationMode) -> ValidationResult {
        let options = ValidationOptions::new(mode).client_visible_only(self.client_visible_only);
        self.validate_record_with(record, &options)
    }

    /// Validate one record with explicit options
    pub fn validate_record_with(
        &self,
        record: &Value,
        options: &ValidationOptions,
    ) -> ValidationResult {
        let started = Instant::now();
        let rules = self.rules.load();

        let mut findings = Vec::new();
        for rule in rules.rules() {
            if !applies(rule, options) {
                continue;
            }
            findings.extend(self.apply_rule_guarded(rule, record));
        }
        let result = ValidationResult::aggregate(findings);

        let entry_id = record.get("id").and_then(Value::as_str).unwrap_or("<none>");
        debug!(
            entry_id,
            mode = %options.mode,
            errors = result.errors().len(),
            warnings = result.warnings().len(),
            info = result.info().len(),
            elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
            "Validation pass complete"
        );
        result
    }

    /// Validate a batch in parallel
    ///
    /// Results are keyed by record `id`; records without one are keyed
    /// `#<index>`, and repeated ids after the first become `<id>#<index>`
    /// (with a `.<n>` suffix if that key is already taken). Every record gets
    /// its own entry.
    pub fn validate_record_set(
        &self,
        records: &[Value],
        mode: ValidationMode,
    ) -> BTreeMap<String, ValidationResult> {
        let keys = record_keys(records);
        records
            .par_iter()
            .zip(keys.into_par_iter())
            .map(|(record, key)| (key, self.validate_record(record, mode)))
            .collect()
    }

    fn apply_rule_guarded(&self, rule: &Rule, record: &Value) -> Vec<Finding> {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.apply_rule(rule, record)))
            .unwrap_or_else(|payload| Err(RuleError::Panicked(panic_message(payload.as_ref()))));

        outcome.unwrap_or_else(|err| {
            warn!(rule_id = %rule.id, error = %err, "Rule could not be applied");
            vec![Finding {
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                message: format!("Rule '{}' could not be applied: {err}", rule.id),
                path: rule.path.clone(),
                priority: Priority::Critical,
                category: rule.category,
                value: Value::Null,
            }]
        })
    }

    fn apply_rule(&self, rule: &Rule, record: &Value) -> std::result::Result<Vec<Finding>, RuleError> {
        let expr = self.evaluator.compile(&rule.path)?;
        let matches = expr.evaluate(record);

        match &rule.condition {
            Condition::Custom { function_name } => {
                let validator = self
                    .validators
                    .get(function_name)
                    .ok_or_else(|| RuleError::MissingCustomValidator(function_name.clone()))?;
                let check = CustomCheck {
                    record,
                    rule,
                    matches: &matches,
                    settings: &self.settings,
                };
                validator(&check)
            }
            Condition::Required => {
                if matches.is_empty() && !expr.has_wildcard() {
                    return Ok(vec![missing_finding(rule, &expr)]);
                }
                Ok(self.check_matches(rule, matches.iter()))
            }
            Condition::IfPresent => {
                Ok(self.check_matches(rule, matches.iter().filter(|m| !m.value.is_null())))
            }
        }
    }

    fn check_matches<'m, 'a: 'm>(
        &self,
        rule: &Rule,
        matches: impl Iterator<Item = &'m PathMatch<'a>>,
    ) -> Vec<Finding> {
        let Some(constraint) = &rule.constraint else {
            return Vec::new();
        };
        matches
            .filter(|m| !constraint::check(m.value, constraint))
            .map(|m| {
                let value = value_text(m.value);
                let key = m.key.as_deref().unwrap_or_else(|| last_key(&m.path));
                let detail = format!("value does not satisfy the {} constraint", constraint.type_name());
                let message = render_template(
                    &rule.message_template,
                    &[
                        ("value", value.as_str()),
                        ("key", key),
                        ("path", m.path.as_str()),
                        ("detail", detail.as_str()),
                    ],
                );
                Finding::from_rule(rule, message, m.path.clone(), m.value.clone())
            })
            .collect()
    }
}

fn applies(rule: &Rule, options: &ValidationOptions) -> bool {
    rule.enabled
        && (rule.client_visible || !options.client_visible_only)
        && rule.applicability_mode.applies_to(options.mode)
}

fn check_custom_functions(
    rules: &RuleRepository,
    validators: &CustomValidatorRegistry,
) -> Result<()> {
    for rule in rules.rules() {
        if let Some(name) = rule.custom_function()
            && !validators.contains(name)
        {
            return Err(Error::UnknownCustomValidator {
                rule_id: rule.id.clone(),
                function_name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Rule path in canonical `$`-rooted form
fn canonical_path(expr: &PathExpr) -> String {
    expr.segments()
        .iter()
        .fold("$".to_string(), |path, segment| match segment {
            Segment::Field(name) => push_field(&path, name),
            Segment::Index(index) => format!("{path}[{index}]"),
            Segment::Wildcard => format!("{path}[*]"),
        })
}

fn missing_finding(rule: &Rule, expr: &PathExpr) -> Finding {
    let path = canonical_path(expr);
    let message = render_template(
        &rule.message_template,
        &[
            ("value", MISSING_VALUE),
            ("key", last_key(&path)),
            ("path", path.as_str()),
            ("detail", "required value is missing"),
        ],
    );
    Finding::from_rule(rule, message, path, Value::Null)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn record_keys(records: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let id = record
                .get("id")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty());
            let base = id.unwrap_or_default();
            let mut key = id.map_or_else(|| format!("#{index}"), str::to_string);
            // generated keys may themselves be taken by a literal id
            let mut attempt = 0;
            while seen.contains(&key) {
                key = match attempt {
                    0 => format!("{base}#{index}"),
                    n => format!("{base}#{index}.{n}"),
                };
                attempt += 1;
            }
            seen.insert(key.clone());
            key
        })
        .collect()
}
