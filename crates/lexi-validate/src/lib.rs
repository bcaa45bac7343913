//! Entry Validation for Lexicographic Dictionaries
//!
//! This crate checks dictionary entries (nested records of headwords, senses,
//! definitions, relations and notes) against a declarative rule set:
//! - Structural presence/absence of fields, addressed by path expressions
//! - Type and range constraints (string, array, object, number, boolean)
//! - Cross-field invariants through named custom validators (variant
//!   exemptions, circular references, language codes, dates, part of speech)
//!
//! Findings are partitioned by priority; only critical findings make a record
//! invalid. The engine reports and never refuses to run: a rule that fails to
//! apply becomes a critical finding naming it.
//!
//! # Example
//!
//! ```ignore
//! use lexi_validate::{RuleRepository, ValidationEngine, ValidationMode};
//! use serde_json::json;
//!
//! let engine = ValidationEngine::new(RuleRepository::builtin()?)?;
//! let record = json!({"id": "e1", "lexical_unit": {"en": "test"}, "senses": []});
//! let result = engine.validate_record(&record, ValidationMode::Save);
//! assert!(!result.is_valid());
//! ```

pub mod config;
pub mod constraint;
pub mod engine;
pub mod error;
pub mod logging;
pub mod path;
pub mod reporter;
pub mod result;
pub mod rules;
pub mod validators;

pub use config::{ConfigLoader, EngineConfig, LoggingConfig, ValidatorConfig};
pub use engine::{ValidationEngine, ValidationOptions};
pub use error::{Error, Result, RuleError};
pub use path::{PathError, PathEvaluator, PathExpr, PathMatch, Segment};
pub use reporter::{Reporter, ValidationReport, ValidationSummary};
pub use result::{Finding, ValidationResult};
pub use rules::{
    Category, Condition, Constraint, Priority, Rule, RuleRepository, StringConstraint,
    ValidationMode,
};
pub use validators::{CustomCheck, CustomValidatorFn, CustomValidatorRegistry, ValidatorSettings};
