//! Rule model
//!
//! Typed, compiled form of a rule. Everything here is immutable once a
//! [`RuleRepository`](super::RuleRepository) has been built.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Blocks persistence; the only priority affecting validity
    #[serde(alias = "error")]
    Critical,
    /// Should be fixed, never blocks
    Warning,
    /// Editorial guidance
    #[serde(alias = "info")]
    Informational,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "CRITICAL"),
            Self::Warning => write!(f, "WARNING"),
            Self::Informational => write!(f, "INFO"),
        }
    }
}

/// Category of a rule, for grouping in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Entry identity and headword structure
    EntryLevel,
    /// Sense presence and content
    SenseLevel,
    /// Entry and sense notes
    Note,
    /// Lexical relations between entries and senses
    Relation,
    /// Pronunciation fields
    Pronunciation,
    /// Language / writing-system codes
    Language,
    /// Date-valued fields
    Date,
    /// Grammatical information
    PartOfSpeech,
    /// Example sentences
    Example,
    /// Variant forms
    Variant,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntryLevel => write!(f, "Entry"),
            Self::SenseLevel => write!(f, "Sense"),
            Self::Note => write!(f, "Note"),
            Self::Relation => write!(f, "Relation"),
            Self::Pronunciation => write!(f, "Pronunciation"),
            Self::Language => write!(f, "Language"),
            Self::Date => write!(f, "Date"),
            Self::PartOfSpeech => write!(f, "Part of Speech"),
            Self::Example => write!(f, "Example"),
            Self::Variant => write!(f, "Variant"),
        }
    }
}

/// Validation pass mode, also used as a rule's applicability mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    Save,
    Delete,
    Draft,
    #[default]
    All,
}

impl ValidationMode {
    /// Whether a rule declared for `self` runs during a `pass` pass
    pub fn applies_to(self, pass: ValidationMode) -> bool {
        self == Self::All || pass == Self::All || self == pass
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Save => write!(f, "save"),
            Self::Delete => write!(f, "delete"),
            Self::Draft => write!(f, "draft"),
            Self::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "save" => Ok(Self::Save),
            "delete" => Ok(Self::Delete),
            "draft" => Ok(Self::Draft),
            "all" => Ok(Self::All),
            other => Err(format!(
                "invalid validation mode '{other}' (expected save, delete, draft or all)"
            )),
        }
    }
}

/// When a rule fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Path must resolve (unless it fans out over an array); matches are checked
    Required,
    /// Only non-null matches are checked
    IfPresent,
    /// Delegates to a named custom validator
    Custom { function_name: String },
}

/// String bounds
#[derive(Debug, Clone, Default)]
pub struct StringConstraint {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Anchored: the whole string must match
    pub pattern: Option<Regex>,
    /// Unanchored: any match fails the check
    pub not_pattern: Option<Regex>,
}

/// Typed constraint with its type-specific bounds
#[derive(Debug, Clone)]
pub enum Constraint {
    String(StringConstraint),
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

impl Constraint {
    /// Name of the target type
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Array { .. } => "array",
            Self::Object { .. } => "object",
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// A compiled rule
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique rule identifier (e.g., "R2.1.1")
    pub id: String,
    /// Human-readable rule name
    pub name: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    /// Path expression the rule is anchored at
    pub path: String,
    pub condition: Condition,
    /// Absent only for custom rules
    pub constraint: Option<Constraint>,
    /// Message with `{value}`, `{key}`, `{path}` and `{detail}` placeholders
    pub message_template: String,
    /// Whether the rule runs in client-visible passes
    pub client_visible: bool,
    pub applicability_mode: ValidationMode,
    /// Disabled rules are kept in the repository but never applied
    pub enabled: bool,
}

impl Rule {
    /// Name of the custom validator, if this is a custom rule
    pub fn custom_function(&self) -> Option<&str> {
        match &self.condition {
            Condition::Custom { function_name } => Some(function_name),
            _ => None,
        }
    }
}
