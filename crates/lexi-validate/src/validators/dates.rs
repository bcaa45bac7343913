//! Date field validator
//!
//! Walks the whole record: any field whose name contains `date`
//! (case-insensitive) must hold a string matching the configured pattern.
//! Legacy numbered date custom fields are skipped, as are null values.

use chrono::NaiveDate;
use serde_json::Value;

use super::CustomCheck;
use crate::error::RuleError;
use crate::path::push_field;
use crate::result::Finding;

fn check_date(check: &CustomCheck<'_>, text: &str) -> Option<String> {
    if !check.settings.date_pattern.is_match(text) {
        return Some(format!("'{text}' is not a recognised date"));
    }
    // the pattern only checks shape; reject impossible calendar days
    if let Some(day) = text.get(..10)
        && day.as_bytes().get(4) == Some(&b'-')
        && NaiveDate::parse_from_str(day, "%Y-%m-%d").is_err()
    {
        return Some(format!("'{day}' is not a calendar date"));
    }
    None
}

fn visit(check: &CustomCheck<'_>, value: &Value, path: &str, findings: &mut Vec<Finding>) {
    match value {
        Value::Object(fields) => {
            for (key, child) in fields {
                let child_path = push_field(path, key);
                let is_date_field = key.to_lowercase().contains("date")
                    && !check.settings.legacy_date_fields.is_match(key);
                if is_date_field {
                    let problem = match child {
                        Value::Null => None,
                        Value::String(text) => check_date(check, text),
                        Value::Object(_) | Value::Array(_) => None,
                        other => Some(format!("expected a date string, found {other}")),
                    };
                    if let Some(detail) = problem {
                        findings.push(check.finding(&child_path, child, &detail));
                    }
                }
                visit(check, child, &child_path, findings);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                visit(check, item, &format!("{path}[{index}]"), findings);
            }
        }
        _ => {}
    }
}

/// Every date-named field in the record must carry a valid date
pub fn date_fields(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    let mut findings = Vec::new();
    visit(check, check.record, "$", &mut findings);
    Ok(findings)
}
