//! Relation validators: synonym/antonym exclusion and the three
//! circular-reference checks
//!
//! The circular checks split the relations between them so that a
//! self-reference is reported exactly once: component relations at entry
//! level, every other entry-level relation, and sense-level relations.

use serde_json::Value;
use std::collections::BTreeSet;

use super::CustomCheck;
use super::senses::collect_senses;
use crate::error::RuleError;
use crate::path::push_field;
use crate::result::Finding;

/// Relation types linking an entry to its components
pub const COMPONENT_RELATION_TYPES: [&str; 2] = ["_component-lexeme", "_complex-form"];

/// Relation type that marks variant entries when it carries [`VARIANT_TYPE_TRAIT`]
pub const VARIANT_RELATION_TYPE: &str = "_component-lexeme";

pub const VARIANT_TYPE_TRAIT: &str = "variant-type";

fn relation_type(relation: &Value) -> Option<&str> {
    relation.get("type").and_then(Value::as_str)
}

fn relation_ref(relation: &Value) -> Option<&str> {
    relation.get("ref").and_then(Value::as_str)
}

fn is_component(relation: &Value) -> bool {
    relation_type(relation).is_some_and(|t| COMPONENT_RELATION_TYPES.contains(&t))
}

/// Whether a relation's traits name `trait_name`
///
/// Traits come either as a mapping (`{"variant-type": "..."}`) or as a list
/// of `{name, value}` objects.
pub fn has_trait(relation: &Value, trait_name: &str) -> bool {
    match relation.get("traits") {
        Some(Value::Object(traits)) => traits.contains_key(trait_name),
        Some(Value::Array(traits)) => traits
            .iter()
            .any(|t| t.get("name").and_then(Value::as_str) == Some(trait_name)),
        _ => false,
    }
}

/// An entry is a variant when a component-lexeme relation carries a variant type
pub fn is_variant_entry(entry: &Value) -> bool {
    entry
        .get("relations")
        .and_then(Value::as_array)
        .is_some_and(|relations| {
            relations.iter().any(|r| {
                relation_type(r) == Some(VARIANT_RELATION_TYPE) && has_trait(r, VARIANT_TYPE_TRAIT)
            })
        })
}

fn entry_relations(entry: &Value) -> impl Iterator<Item = (String, &Value)> {
    entry
        .get("relations")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(index, relation)| (format!("$.relations[{index}]"), relation))
}

/// No target may be both a synonym and an antonym of the same entry
pub fn synonym_antonym_exclusion(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    let synonyms: BTreeSet<&str> = entry_relations(check.record)
        .filter(|(_, r)| relation_type(r).is_some_and(|t| t.eq_ignore_ascii_case("synonym")))
        .filter_map(|(_, r)| relation_ref(r))
        .collect();
    if synonyms.is_empty() {
        return Ok(Vec::new());
    }

    let mut reported = BTreeSet::new();
    let mut findings = Vec::new();
    for (path, relation) in entry_relations(check.record) {
        if !relation_type(relation).is_some_and(|t| t.eq_ignore_ascii_case("antonym")) {
            continue;
        }
        let Some(target) = relation_ref(relation) else {
            continue;
        };
        if synonyms.contains(target) && reported.insert(target) {
            let detail = format!("'{target}' is both a synonym and an antonym");
            findings.push(check.finding(
                &push_field(&path, "ref"),
                &Value::String(target.to_string()),
                &detail,
            ));
        }
    }
    Ok(findings)
}

fn self_references(check: &CustomCheck<'_>, keep: impl Fn(&Value) -> bool) -> Vec<Finding> {
    let Some(id) = check.entry_id() else {
        return Vec::new();
    };
    entry_relations(check.record)
        .filter(|(_, r)| keep(r) && relation_ref(r) == Some(id))
        .map(|(path, r)| {
            let detail = format!(
                "'{}' relation references its own entry '{id}'",
                relation_type(r).unwrap_or("untyped")
            );
            check.finding(&push_field(&path, "ref"), &Value::String(id.to_string()), &detail)
        })
        .collect()
}

/// A component or complex-form relation may not point at its own entry
pub fn circular_component_reference(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    Ok(self_references(check, is_component))
}

/// Any other entry-level relation may not point at its own entry
pub fn circular_entry_reference(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    Ok(self_references(check, |r| !is_component(r)))
}

/// Sense relations may not point at the entry or at one of its own senses
///
/// Ownership is read from the reference alone: a sense ref belongs to entry
/// `e1` when it is `e1` or starts with `e1_` (`e1_s2`). Records carry no
/// registry of other entries, so a ref into a different entry whose id itself
/// starts with `e1_` (`e1_extra_s1`) is also treated as owned by `e1`. Entry
/// ids that embed another id followed by `_` should not be mixed in one
/// lexicon.
pub fn circular_sense_reference(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    let Some(id) = check.entry_id() else {
        return Ok(Vec::new());
    };
    let own_prefix = format!("{id}_");
    let mut findings = Vec::new();

    for visit in collect_senses(check.record) {
        let Some(relations) = visit.sense.get("relations").and_then(Value::as_array) else {
            continue;
        };
        for (index, relation) in relations.iter().enumerate() {
            let Some(target) = relation_ref(relation) else {
                continue;
            };
            if target == id || target.starts_with(&own_prefix) {
                let path = format!("{}.relations[{index}].ref", visit.path);
                let detail = format!("sense relation targets '{target}' within entry '{id}'");
                findings.push(check.finding(&path, &Value::String(target.to_string()), &detail));
            }
        }
    }
    Ok(findings)
}
