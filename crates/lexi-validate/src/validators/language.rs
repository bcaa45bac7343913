//! Language-code validators

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use super::CustomCheck;
use super::senses::collect_senses;
use super::settings::ValidatorSettings;
use crate::error::RuleError;
use crate::path::push_field;
use crate::result::Finding;

/// Lowercase `language[-subtag]*`
static LANGUAGE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,3}(?:-[a-z0-9]{1,8})*$").expect("valid regex"));

/// Problem with a language code, or `None` when the code is acceptable
///
/// An empty `allowed` list means only the format is checked.
pub fn check_language_code(
    code: &str,
    allowed: &[String],
    settings: &ValidatorSettings,
) -> Option<String> {
    if !LANGUAGE_CODE.is_match(code) {
        return Some(format!(
            "'{code}' is not a valid language code (expected lowercase language[-subtag])"
        ));
    }
    if settings.denied_language_codes.iter().any(|d| d == code) {
        let base = settings.source_language.as_deref().unwrap_or("xx");
        return Some(format!(
            "'{code}' is not a language code; mark phonetic transcriptions with the \
             '-fonipa' subtag instead (e.g. '{base}-fonipa')"
        ));
    }
    if !allowed.is_empty() && !allowed.iter().any(|a| a == code) {
        return Some(format!(
            "'{code}' is not one of the project languages: {}",
            allowed.join(", ")
        ));
    }
    None
}

fn check_keys(
    check: &CustomCheck<'_>,
    container: Option<&Value>,
    path: &str,
    allowed: &[String],
    findings: &mut Vec<Finding>,
) {
    let Some(forms) = container.and_then(Value::as_object) else {
        return;
    };
    for code in forms.keys() {
        if let Some(detail) = check_language_code(code, allowed, check.settings) {
            findings.push(check.finding(
                &push_field(path, code),
                &Value::String(code.clone()),
                &detail,
            ));
        }
    }
}

/// Writing systems used by the headword, definitions, glosses and the
/// declared source language must be well-formed
pub fn language_codes(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    let mut findings = Vec::new();

    if let Some(source) = check.record.get("source_language").and_then(Value::as_str)
        && let Some(detail) = check_language_code(source, &[], check.settings)
    {
        findings.push(check.finding(
            "$.source_language",
            &Value::String(source.to_string()),
            &detail,
        ));
    }

    check_keys(
        check,
        check.record.get("lexical_unit"),
        "$.lexical_unit",
        &[],
        &mut findings,
    );
    for visit in collect_senses(check.record) {
        for field in ["definition", "gloss"] {
            let path = push_field(&visit.path, field);
            check_keys(check, visit.sense.get(field), &path, &[], &mut findings);
        }
    }
    Ok(findings)
}

/// Pronunciation writing systems, against the pronunciation allow-list
pub fn pronunciation_languages(check: &CustomCheck<'_>) -> Result<Vec<Finding>, RuleError> {
    let mut findings = Vec::new();
    for m in check.matches {
        check_keys(
            check,
            Some(m.value),
            &m.path,
            &check.settings.pronunciation_languages,
            &mut findings,
        );
    }
    Ok(findings)
}
