//! Record input
//!
//! Turns JSON files into records for the engine. Failures here are reported
//! before any validation runs and never show up as findings.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A file could not be turned into records
#[derive(Error, Debug)]
pub enum RecordSourceError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Top level is neither a record nor a list of records
    #[error("{path}: expected an entry object or an array of entries, found {found}")]
    NotARecord { path: PathBuf, found: &'static str },
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse records from JSON text; `path` is only used in errors
pub fn parse_records(content: &str, path: &Path) -> Result<Vec<Value>, RecordSourceError> {
    let value: Value = serde_json::from_str(content).map_err(|source| RecordSourceError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(_) => Ok(vec![value]),
        Value::Array(items) => {
            if let Some(bad) = items.iter().find(|item| !item.is_object()) {
                return Err(RecordSourceError::NotARecord {
                    path: path.to_path_buf(),
                    found: kind(bad),
                });
            }
            Ok(items)
        }
        other => Err(RecordSourceError::NotARecord {
            path: path.to_path_buf(),
            found: kind(&other),
        }),
    }
}

/// Read every record held by a file
pub fn read_records(path: &Path) -> Result<Vec<Value>, RecordSourceError> {
    let content = std::fs::read_to_string(path).map_err(|source| RecordSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&content, path)
}
