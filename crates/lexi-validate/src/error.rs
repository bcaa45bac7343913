//! Error handling types
//!
//! Two families live here. [`Error`] covers everything that stops an engine
//! from being built: unreadable or malformed rule documents, bad regexes,
//! unknown custom validators and configuration extraction failures. These are
//! fatal and surface at construction time.
//!
//! [`RuleError`] covers failures while applying a single rule to a record.
//! The engine never returns these to callers; each one is downgraded to a
//! critical finding that names the rule.

use std::path::PathBuf;
use thiserror::Error;

use crate::path::PathError;

/// Result type alias for engine construction and configuration
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration and rule-loading errors
#[derive(Error, Debug)]
pub enum Error {
    /// Rule or configuration source could not be read
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File or directory being read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Rule document is not valid YAML/JSON
    #[error("Parse error in {file}: {message}")]
    Parse {
        /// Document that failed to parse
        file: PathBuf,
        /// Parser message
        message: String,
    },

    /// Rule document has no usable rules mapping
    #[error("Invalid rule document {file}: {message}")]
    Document {
        /// Offending document
        file: PathBuf,
        /// What is wrong with it
        message: String,
    },

    /// A single rule is missing a required field or has a malformed one
    #[error("Invalid rule '{rule_id}': {message}")]
    RuleDefinition {
        /// Rule identifier
        rule_id: String,
        /// Description of the structural problem
        message: String,
    },

    /// A regex field of a rule does not compile
    #[error("Invalid regex in rule '{rule_id}' field '{field}': {source}")]
    InvalidRegex {
        /// Rule identifier (or configuration key)
        rule_id: String,
        /// Field holding the pattern
        field: String,
        /// Compilation error
        #[source]
        source: regex::Error,
    },

    /// Two rule sources define the same id
    #[error("Duplicate rule id '{rule_id}' (also defined in {file})")]
    DuplicateRule {
        /// Rule identifier
        rule_id: String,
        /// Later source that redefines it
        file: PathBuf,
    },

    /// A custom rule names a validator nobody registered
    #[error("Rule '{rule_id}' references unknown custom validator '{function_name}'")]
    UnknownCustomValidator {
        /// Rule identifier
        rule_id: String,
        /// Unregistered validator name
        function_name: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// Layered configuration could not be extracted
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a rule definition error
    pub fn rule<I: Into<String>, M: Into<String>>(rule_id: I, message: M) -> Self {
        Self::RuleDefinition {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Failure while applying one rule to one record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    /// The rule's path expression does not parse
    #[error(transparent)]
    InvalidPath(#[from] PathError),

    /// The custom validator vanished between load and application
    #[error("custom validator '{0}' is not registered")]
    MissingCustomValidator(String),

    /// A custom validator reported that it could not run
    #[error("custom validator '{name}' failed: {message}")]
    Custom {
        /// Validator name
        name: String,
        /// Failure description
        message: String,
    },

    /// Rule application panicked
    #[error("rule application panicked: {0}")]
    Panicked(String),
}

impl RuleError {
    /// Create a custom validator failure
    pub fn custom<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self::Custom {
            name: name.into(),
            message: message.into(),
        }
    }
}
