//! Note validators
//!
//! Notes come in two shapes: a mapping keyed by note type, whose values are
//! either plain strings or multilingual `{lang: text}` objects, or a list of
//! `{type, content}` objects. Rules anchor these validators at `$.notes`.

use serde_json::Value;
use std::collections::HashSet;

use super::CustomCheck;
use super::language::check_language_code;
use crate::error::RuleError;
use crate::path::push_field;
use crate::result::Finding;

/// Listed notes may not repeat a `type`; mapping notes pass trivially
pub fn unique_note_types(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    let mut findings = Vec::new();
    for m in check.matches {
        let Some(notes) = m.value.as_array() else {
            continue;
        };
        let mut seen = HashSet::new();
        for (index, note) in notes.iter().enumerate() {
            let Some(note_type) = note.get("type").and_then(Value::as_str) else {
                continue;
            };
            if !seen.insert(note_type) {
                let path = format!("{}[{index}].type", m.path);
                let detail = format!("note type '{note_type}' appears more than once");
                findings.push(check.finding(
                    &path,
                    &Value::String(note_type.to_string()),
                    &detail,
                ));
            }
        }
    }
    Ok(findings)
}

/// String-valued notes must have content after trimming
pub fn non_empty_simple_notes(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    let mut findings = Vec::new();
    let mut blank = |path: String, note_type: &str, value: &Value| {
        let detail = format!("'{note_type}' note is empty");
        findings.push(check.finding(&path, value, &detail));
    };

    for m in check.matches {
        match m.value {
            Value::Object(notes) => {
                for (note_type, content) in notes {
                    if content.as_str().is_some_and(|s| s.trim().is_empty()) {
                        blank(push_field(&m.path, note_type), note_type, content);
                    }
                }
            }
            Value::Array(notes) => {
                for (index, note) in notes.iter().enumerate() {
                    let Some(content) = note.get("content") else {
                        continue;
                    };
                    if content.as_str().is_some_and(|s| s.trim().is_empty()) {
                        let note_type = note.get("type").and_then(Value::as_str).unwrap_or("untyped");
                        blank(format!("{}[{index}].content", m.path), note_type, content);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(findings)
}

/// Languages of multilingual notes, against the project allow-list
pub fn note_languages(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    let allowed = &check.settings.project_languages;
    let mut multilingual: Vec<(String, &Value)> = Vec::new();
    for m in check.matches {
        match m.value {
            Value::Object(notes) => multilingual.extend(
                notes
                    .iter()
                    .filter(|(_, content)| content.is_object())
                    .map(|(note_type, content)| (push_field(&m.path, note_type), content)),
            ),
            Value::Array(notes) => multilingual.extend(
                notes
                    .iter()
                    .enumerate()
                    .filter_map(|(index, note)| Some((index, note.get("content")?)))
                    .filter(|(_, content)| content.is_object())
                    .map(|(index, content)| (format!("{}[{index}].content", m.path), content)),
            ),
            _ => {}
        }
    }

    let mut findings = Vec::new();
    for (path, content) in multilingual {
        let Some(forms) = content.as_object() else {
            continue;
        };
        for code in forms.keys() {
            if let Some(detail) = check_language_code(code, allowed, check.settings) {
                findings.push(check.finding(
                    &push_field(&path, code),
                    &Value::String(code.clone()),
                    &detail,
                ));
            }
        }
    }
    Ok(findings)
}
