//! YAML Rule Loader
//!
//! Loads rule documents (YAML, or JSON as a YAML subset) from a file or a
//! directory, checks each definition structurally and compiles it into a
//! typed [`Rule`].
//!
//! Document shape:
//!
//! ```yaml
//! rules:
//!   R2.1.1:
//!     name: Sense identifier
//!     category: sense_level
//!     priority: critical
//!     path: "$.senses[*].id"
//!     condition: required
//!     constraint: { type: string, min_length: 1 }
//!     message_template: "Sense at {path} needs a non-empty id"
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;
use walkdir::WalkDir;

use super::model::{
    Category, Condition, Constraint, Priority, Rule, StringConstraint, ValidationMode,
};
use crate::{Error, Result};

/// Raw condition keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Required,
    IfPresent,
    Custom,
}

/// Raw constraint, tagged by target type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConstraintDefinition {
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<String>,
        not_pattern: Option<String>,
    },
    Array {
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    Object {
        min_properties: Option<usize>,
        max_properties: Option<usize>,
    },
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Boolean,
}

fn default_true() -> bool {
    true
}

/// Rule definition as written in a document, before compilation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RuleDefinition {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    #[validate(length(min = 1, message = "path must not be empty"))]
    pub path: String,
    pub condition: ConditionKind,
    #[serde(default)]
    pub custom_function: Option<String>,
    #[serde(default)]
    pub constraint: Option<ConstraintDefinition>,
    #[validate(length(min = 1, message = "message_template must not be empty"))]
    pub message_template: String,
    #[serde(default = "default_true")]
    pub client_visible: bool,
    #[serde(default)]
    pub applicability_mode: ValidationMode,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl RuleDefinition {
    /// Check and compile into a typed rule
    pub fn compile(self, rule_id: &str) -> Result<Rule> {
        self.validate()
            .map_err(|e| Error::rule(rule_id, e.to_string()))?;

        let condition = match (self.condition, self.custom_function) {
            (ConditionKind::Custom, Some(name)) if !name.trim().is_empty() => Condition::Custom {
                function_name: name.trim().to_string(),
            },
            (ConditionKind::Custom, _) => {
                return Err(Error::rule(
                    rule_id,
                    "condition 'custom' requires a non-empty 'custom_function'",
                ));
            }
            (_, Some(_)) => {
                return Err(Error::rule(
                    rule_id,
                    "'custom_function' is only valid with condition 'custom'",
                ));
            }
            (ConditionKind::Required, None) => Condition::Required,
            (ConditionKind::IfPresent, None) => Condition::IfPresent,
        };

        let constraint = match self.constraint {
            Some(def) => Some(compile_constraint(rule_id, def)?),
            None if matches!(condition, Condition::Custom { .. }) => None,
            None => {
                return Err(Error::rule(
                    rule_id,
                    "missing field `constraint` (required unless condition is 'custom')",
                ));
            }
        };

        Ok(Rule {
            id: rule_id.to_string(),
            name: self.name,
            description: self.description,
            category: self.category,
            priority: self.priority,
            path: self.path,
            condition,
            constraint,
            message_template: self.message_template,
            client_visible: self.client_visible,
            applicability_mode: self.applicability_mode,
            enabled: self.enabled,
        })
    }
}

fn compile_regex(rule_id: &str, field: &str, pattern: &str, anchored: bool) -> Result<Regex> {
    let source = if anchored {
        format!("^(?:{pattern})$")
    } else {
        pattern.to_string()
    };
    Regex::new(&source).map_err(|source| Error::InvalidRegex {
        rule_id: rule_id.to_string(),
        field: field.to_string(),
        source,
    })
}

fn check_bounds<T: PartialOrd + std::fmt::Display>(
    rule_id: &str,
    low_name: &str,
    low: Option<T>,
    high_name: &str,
    high: Option<T>,
) -> Result<()> {
    if let (Some(low), Some(high)) = (low, high)
        && low > high
    {
        return Err(Error::rule(
            rule_id,
            format!("{low_name} ({low}) exceeds {high_name} ({high})"),
        ));
    }
    Ok(())
}

fn compile_constraint(rule_id: &str, def: ConstraintDefinition) -> Result<Constraint> {
    Ok(match def {
        ConstraintDefinition::String {
            min_length,
            max_length,
            pattern,
            not_pattern,
        } => {
            check_bounds(rule_id, "min_length", min_length, "max_length", max_length)?;
            Constraint::String(StringConstraint {
                min_length,
                max_length,
                pattern: pattern
                    .as_deref()
                    .map(|p| compile_regex(rule_id, "pattern", p, true))
                    .transpose()?,
                not_pattern: not_pattern
                    .as_deref()
                    .map(|p| compile_regex(rule_id, "not_pattern", p, false))
                    .transpose()?,
            })
        }
        ConstraintDefinition::Array {
            min_items,
            max_items,
        } => {
            check_bounds(rule_id, "min_items", min_items, "max_items", max_items)?;
            Constraint::Array {
                min_items,
                max_items,
            }
        }
        ConstraintDefinition::Object {
            min_properties,
            max_properties,
        } => {
            check_bounds(
                rule_id,
                "min_properties",
                min_properties,
                "max_properties",
                max_properties,
            )?;
            Constraint::Object {
                min_properties,
                max_properties,
            }
        }
        ConstraintDefinition::Number { minimum, maximum } => {
            check_bounds(rule_id, "minimum", minimum, "maximum", maximum)?;
            Constraint::Number { minimum, maximum }
        }
        ConstraintDefinition::Boolean => Constraint::Boolean,
    })
}

/// A compiled rule together with the document it came from
#[derive(Debug, Clone)]
pub struct LoadedRule {
    pub rule: Rule,
    pub origin: PathBuf,
}

/// Rule document loader for a file or a directory of documents
pub struct YamlRuleLoader {
    rules_path: PathBuf,
}

impl YamlRuleLoader {
    /// Create a loader for a rule file or directory
    pub fn new(rules_path: impl Into<PathBuf>) -> Self {
        Self {
            rules_path: rules_path.into(),
        }
    }

    pub fn rules_path(&self) -> &Path {
        &self.rules_path
    }

    /// Load every rule reachable from the configured path
    ///
    /// Directories are walked in file-name order so the resulting rule order
    /// is stable across runs.
    pub fn load_all_rules(&self) -> Result<Vec<LoadedRule>> {
        if !self.rules_path.exists() {
            return Err(Error::Io {
                path: self.rules_path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "rule source does not exist",
                ),
            });
        }

        if self.rules_path.is_file() {
            return self.load_rule_file(&self.rules_path);
        }

        let mut rules = Vec::new();
        for entry in WalkDir::new(&self.rules_path).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Io {
                path: self.rules_path.clone(),
                source: std::io::Error::other(e),
            })?;
            let path = entry.path();
            if Self::is_rule_file(path) {
                rules.extend(self.load_rule_file(path)?);
            }
        }

        if rules.is_empty() {
            return Err(Error::Document {
                file: self.rules_path.clone(),
                message: "no rule documents found".to_string(),
            });
        }
        Ok(rules)
    }

    /// Load rules from a specific file
    pub fn load_rule_file(&self, path: &Path) -> Result<Vec<LoadedRule>> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_str(&content, path)
    }

    /// Parse and compile a document held in memory
    pub fn load_str(content: &str, origin: &Path) -> Result<Vec<LoadedRule>> {
        let document: serde_json::Value =
            serde_yaml::from_str(content).map_err(|e| Error::Parse {
                file: origin.to_path_buf(),
                message: format!("YAML parse error: {e}"),
            })?;

        let rules = match document.get("rules") {
            Some(rules) => rules,
            None => &document,
        };
        let rules = rules.as_object().ok_or_else(|| Error::Document {
            file: origin.to_path_buf(),
            message: "expected a mapping of rule id to rule definition".to_string(),
        })?;
        if rules.is_empty() {
            return Err(Error::Document {
                file: origin.to_path_buf(),
                message: "document defines no rules".to_string(),
            });
        }

        rules
            .iter()
            .map(|(id, body)| {
                if !body.is_object() {
                    return Err(Error::rule(id, "rule definition must be a mapping"));
                }
                let definition: RuleDefinition = serde_json::from_value(body.clone())
                    .map_err(|e| Error::rule(id, e.to_string()))?;
                Ok(LoadedRule {
                    rule: definition.compile(id)?,
                    origin: origin.to_path_buf(),
                })
            })
            .collect()
    }

    /// Check if a file is a rule document
    fn is_rule_file(path: &Path) -> bool {
        path.is_file()
            && matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("yml" | "yaml" | "json")
            )
    }
}
