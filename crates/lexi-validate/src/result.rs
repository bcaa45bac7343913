//! Findings and the per-pass validation result

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use regex::{Captures, Regex};
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

use crate::rules::{Category, Priority, Rule};

/// One reported violation of a rule against a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub rule_name: String,
    pub message: String,
    /// Concrete path of the offending value (`$.senses[0].id`)
    pub path: String,
    pub priority: Priority,
    pub category: Category,
    /// Offending value, `null` when the value is absent
    pub value: Value,
}

impl Finding {
    /// Create a finding carrying the rule's identity, priority and category
    pub fn from_rule(
        rule: &Rule,
        message: impl Into<String>,
        path: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            message: message.into(),
            path: path.into(),
            priority: rule.priority,
            category: rule.category,
            value,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at {}: {}",
            self.priority, self.rule_id, self.path, self.message
        )
    }
}

/// Text used for a `{value}` placeholder
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("valid regex"));

/// Substitute `{name}` placeholders in one pass; unknown placeholders are
/// left as written and substituted text is never expanded again
pub(crate) fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            vars.iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| (*value).to_string())
        })
        .into_owned()
}

/// Findings of one validation pass, partitioned by priority
///
/// Partitions keep the order in which rules were evaluated. Only the
/// critical partition affects validity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
    info: Vec<Finding>,
}

impl ValidationResult {
    /// Fold a stream of findings into a result
    pub fn aggregate<I: IntoIterator<Item = Finding>>(findings: I) -> Self {
        findings.into_iter().collect()
    }

    /// Critical findings
    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    pub fn info(&self) -> &[Finding] {
        &self.info
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_critical_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Total findings across all partitions
    pub fn error_count(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.info.len()
    }

    /// Findings of exactly one priority
    pub fn by_priority(&self, priority: Priority) -> &[Finding] {
        match priority {
            Priority::Critical => &self.errors,
            Priority::Warning => &self.warnings,
            Priority::Informational => &self.info,
        }
    }

    /// Findings at `priority` or more severe, most severe first
    pub fn at_or_above(&self, priority: Priority) -> impl Iterator<Item = &Finding> {
        self.iter().filter(move |f| f.priority <= priority)
    }

    /// Every finding: errors, then warnings, then info
    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }

    pub fn into_findings(self) -> Vec<Finding> {
        let mut all = self.errors;
        all.extend(self.warnings);
        all.extend(self.info);
        all
    }
}

impl FromIterator<Finding> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        let mut result = Self::default();
        for finding in iter {
            match finding.priority {
                Priority::Critical => result.errors.push(finding),
                Priority::Warning => result.warnings.push(finding),
                Priority::Informational => result.info.push(finding),
            }
        }
        result
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationResult", 6)?;
        state.serialize_field("is_valid", &self.is_valid())?;
        state.serialize_field("has_critical_errors", &self.has_critical_errors())?;
        state.serialize_field("error_count", &self.error_count())?;
        state.serialize_field("errors", &self.errors)?;
        state.serialize_field("warnings", &self.warnings)?;
        state.serialize_field("info", &self.info)?;
        state.end()
    }
}
