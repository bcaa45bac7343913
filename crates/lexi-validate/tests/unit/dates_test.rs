//! Tests for the date field validator

#[cfg(test)]
mod dates_tests {
    use crate::test_utils::{builtin_engine, engine_with, run_rule, valid_entry};
    use lexi_validate::{ValidationMode, ValidationOptions, ValidatorConfig};
    use serde_json::json;

    #[test]
    fn test_valid_dates_pass() {
        let engine = builtin_engine();
        let mut entry = valid_entry("e1");
        entry["date_created"] = json!("2024-03-01");
        entry["dateModified"] = json!("2024-03-01T10:15:00Z");
        entry["senses"][0]["last_date"] = json!("2023-12-31 23:59:59.5+02:00");
        entry["review_date"] = json!(null);
        assert!(run_rule(&engine, &entry, "R6.1.1").is_empty());
    }

    #[test]
    fn test_invalid_dates_anywhere_in_the_record() {
        let engine = builtin_engine();
        let mut entry = valid_entry("e1");
        entry["date_created"] = json!("01/03/2024");
        entry["senses"][0]["examples"] = json!([{"sentence": {"en": "x"}, "Date": 20240301}]);
        entry["date_modified"] = json!("2024-02-30");
        let findings = run_rule(&engine, &entry, "R6.1.1");
        let paths: Vec<&str> = findings.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "$.senses[0].examples[0].Date",
                "$.date_created",
                "$.date_modified"
            ]
        );
        assert!(findings[2].message.contains("not a calendar date"));
        assert!(findings[1].message.starts_with("Invalid date in 'date_created'"));
    }

    #[test]
    fn test_legacy_numbered_date_fields_are_skipped() {
        let engine = builtin_engine();
        let mut entry = valid_entry("e1");
        entry["custom_date_1"] = json!("sometime");
        entry["date2"] = json!("later");
        assert!(run_rule(&engine, &entry, "R6.1.1").is_empty());
    }

    #[test]
    fn test_configured_date_pattern() {
        let engine = engine_with(&ValidatorConfig {
            date_pattern: r"\d{4}".into(),
            ..ValidatorConfig::default()
        });
        let mut entry = valid_entry("e1");
        entry["date_created"] = json!("2024");
        assert!(run_rule(&engine, &entry, "R6.1.1").is_empty());
        entry["date_created"] = json!("2024-01-01");
        assert_eq!(run_rule(&engine, &entry, "R6.1.1").len(), 1);
    }

    #[test]
    fn test_date_rule_is_internal() {
        let engine = builtin_engine();
        let mut entry = valid_entry("e1");
        entry["date_created"] = json!("yesterday");
        let options = ValidationOptions::new(ValidationMode::Save).client_visible_only(true);
        let result = engine.validate_record_with(&entry, &options);
        assert!(result.iter().all(|f| f.rule_id != "R6.1.1"));
    }
}
