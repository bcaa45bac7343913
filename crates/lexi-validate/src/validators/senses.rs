//! Sense-level validators: content, presence, definitions, nesting and
//! part-of-speech consistency

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::relations::is_variant_entry;
use super::{CustomCheck, has_text, non_blank, text_of};
use crate::error::RuleError;
use crate::path::push_field;
use crate::result::Finding;

/// A sense reached while walking an entry, subsenses included
#[derive(Debug, Clone)]
pub(crate) struct SenseVisit<'a> {
    pub sense: &'a Map<String, Value>,
    pub path: String,
    /// 0 for top-level senses, +1 per `subsenses` level
    pub depth: usize,
}

/// Every sense of an entry in document order (pre-order over subsenses)
pub(crate) fn collect_senses(entry: &Value) -> Vec<SenseVisit<'_>> {
    let mut out = Vec::new();
    if let Some(senses) = entry.get("senses").and_then(Value::as_array) {
        walk(senses, "$.senses", 0, &mut out);
    }
    out
}

fn walk<'a>(senses: &'a [Value], base: &str, depth: usize, out: &mut Vec<SenseVisit<'a>>) {
    for (index, sense) in senses.iter().enumerate() {
        let Some(map) = sense.as_object() else {
            continue;
        };
        let path = format!("{base}[{index}]");
        let children = map.get("subsenses").and_then(Value::as_array);
        out.push(SenseVisit {
            sense: map,
            path: path.clone(),
            depth,
        });
        if let Some(children) = children {
            walk(children, &format!("{path}.subsenses"), depth + 1, out);
        }
    }
}

fn sense_label(visit: &SenseVisit<'_>) -> String {
    visit
        .sense
        .get("id")
        .and_then(Value::as_str)
        .map_or_else(|| visit.path.clone(), str::to_string)
}

fn has_sense_content(sense: &Map<String, Value>) -> bool {
    has_text(sense.get("definition"))
        || has_text(sense.get("gloss"))
        || non_blank(sense, "variant_ref").is_some()
        || sense.get("is_variant").and_then(Value::as_bool) == Some(true)
}

/// Each top-level sense needs a definition, a gloss, a variant reference or
/// the `is_variant` flag; definitions and glosses present in non-source
/// languages must be non-empty. Variant entries are exempt.
pub fn sense_content_or_variant(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    if is_variant_entry(check.record) {
        return Ok(Vec::new());
    }
    let source = check.settings.source_language_for(check.record);
    let mut findings = Vec::new();

    for visit in collect_senses(check.record)
        .iter()
        .filter(|visit| visit.depth == 0)
    {
        if !has_sense_content(visit.sense) {
            let detail = format!(
                "sense '{}' has no definition, gloss or variant reference",
                sense_label(visit)
            );
            findings.push(check.finding(&visit.path, &Value::Object(visit.sense.clone()), &detail));
            continue;
        }

        for field in ["definition", "gloss"] {
            let Some(texts) = visit.sense.get(field).and_then(Value::as_object) else {
                continue;
            };
            let base = push_field(&visit.path, field);
            for (lang, text) in texts {
                if Some(lang.as_str()) == source {
                    continue;
                }
                if text_of(text).is_none_or(|t| t.trim().is_empty()) {
                    let detail = format!("{field} in '{lang}' is empty");
                    findings.push(check.finding(&push_field(&base, lang), text, &detail));
                }
            }
        }
    }
    Ok(findings)
}

/// A non-variant entry must carry at least one sense
pub fn sense_required_unless_variant(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    if is_variant_entry(check.record) {
        return Ok(Vec::new());
    }
    let senses = check.record.get("senses");
    let count = senses.and_then(Value::as_array).map_or(0, Vec::len);
    if count > 0 {
        return Ok(Vec::new());
    }
    let value = senses.cloned().unwrap_or(Value::Null);
    Ok(vec![check.finding(
        "$.senses",
        &value,
        "entry has no senses",
    )])
}

/// Every language present under a sense's `definition` must be non-empty,
/// except the entry's source language
pub fn definition_non_empty(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    let source = check.settings.source_language_for(check.record);
    let mut findings = Vec::new();

    for visit in collect_senses(check.record) {
        let Some(definitions) = visit.sense.get("definition").and_then(Value::as_object) else {
            continue;
        };
        let base = push_field(&visit.path, "definition");
        for (lang, definition) in definitions {
            if Some(lang.as_str()) == source {
                continue;
            }
            if text_of(definition).is_none_or(|t| t.trim().is_empty()) {
                let detail = format!("definition in '{lang}' is empty");
                findings.push(check.finding(&push_field(&base, lang), definition, &detail));
            }
        }
    }
    Ok(findings)
}

/// Subsenses may nest at most `max_subsense_depth` levels
pub fn subsense_depth(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    let max = check.settings.max_subsense_depth;
    let mut findings = Vec::new();
    let mut reported: Vec<String> = Vec::new();

    for visit in collect_senses(check.record) {
        if visit.depth <= max {
            continue;
        }
        // one finding per offending branch, not per descendant
        if reported
            .iter()
            .any(|p| visit.path.strip_prefix(p.as_str()).is_some_and(|rest| rest.starts_with('.')))
        {
            continue;
        }
        let detail = format!("nesting depth {} exceeds the limit of {max}", visit.depth);
        findings.push(check.finding(&visit.path, &Value::Object(visit.sense.clone()), &detail));
        reported.push(visit.path);
    }
    Ok(findings)
}

/// Senses declaring a part of speech must agree with the entry's
pub fn pos_consistency(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    let Some(entry_pos) = check.entry().and_then(|e| non_blank(e, "part_of_speech")) else {
        return Ok(Vec::new());
    };
    let mut findings = Vec::new();

    for visit in collect_senses(check.record) {
        let Some(sense_pos) = non_blank(visit.sense, "part_of_speech") else {
            continue;
        };
        if sense_pos != entry_pos {
            let detail =
                format!("sense part of speech '{sense_pos}' differs from entry '{entry_pos}'");
            let path = push_field(&visit.path, "part_of_speech");
            findings.push(check.finding(&path, &Value::String(sense_pos.to_string()), &detail));
        }
    }
    Ok(findings)
}

/// Senses with conflicting parts of speech make the entry-level one mandatory
pub fn conflicting_pos_requires_entry_pos(
    check: &CustomCheck<'_>,
) -> Result<Vec<Finding>, RuleError> {
    if check.entry().and_then(|e| non_blank(e, "part_of_speech")).is_some() {
        return Ok(Vec::new());
    }
    let declared: BTreeSet<&str> = collect_senses(check.record)
        .iter()
        .filter_map(|visit| non_blank(visit.sense, "part_of_speech"))
        .collect();
    if declared.len() < 2 {
        return Ok(Vec::new());
    }

    let listed = declared.iter().copied().collect::<Vec<_>>().join(", ");
    let value = Value::Array(
        declared
            .iter()
            .map(|pos| Value::String((*pos).to_string()))
            .collect(),
    );
    let detail = format!("senses declare conflicting parts of speech: {listed}");
    Ok(vec![check.finding("$.part_of_speech", &value, &detail)])
}
