//! Tests for the sense-level custom validators

#[cfg(test)]
mod senses_tests {
    use crate::test_utils::{builtin_engine, engine_with, run_rule, valid_entry};
    use lexi_validate::{Priority, ValidationMode, ValidatorConfig};
    use serde_json::json;

    fn variant_relation() -> serde_json::Value {
        json!({"type": "_component-lexeme", "ref": "base", "traits": {"variant-type": "Spelling"}})
    }

    #[test]
    fn test_entry_without_senses_needs_one() {
        let engine = builtin_engine();
        for senses in [json!(null), json!([])] {
            let mut entry = json!({"id": "e1", "lexical_unit": {"en": "w"}});
            if !senses.is_null() {
                entry["senses"] = senses;
            }
            let findings = run_rule(&engine, &entry, "R2.1.1");
            assert_eq!(findings.len(), 1);
            assert!(findings[0].message.contains("at least one sense"));
            assert_eq!(findings[0].path, "$.senses");
        }
    }

    #[test]
    fn test_variant_entry_needs_no_senses() {
        let engine = builtin_engine();
        let entry = json!({
            "id": "e1",
            "lexical_unit": {"en": "colour"},
            "relations": [variant_relation()]
        });
        let result = engine.validate_record(&entry, ValidationMode::Save);
        assert!(result.is_valid(), "{:?}", result.errors());
    }

    #[test]
    fn test_sense_presence_only_in_save_passes() {
        let engine = builtin_engine();
        let entry = json!({"id": "e1", "lexical_unit": {"en": "w"}, "senses": []});
        let result = engine.validate_record(&entry, ValidationMode::Draft);
        assert!(result.iter().all(|f| f.rule_id != "R2.1.1"));
    }

    #[test]
    fn test_sense_without_content_is_reported() {
        let engine = builtin_engine();
        let mut entry = valid_entry("e1");
        entry["senses"] = json!([
            {"id": "e1_s1", "definition": {"en": "ok"}},
            {"id": "e1_s2", "definition": {"en": " "}, "gloss": {}}
        ]);
        let findings = run_rule(&engine, &entry, "R2.2.1");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "$.senses[1]");
        assert!(findings[0].message.contains("e1_s2"));
    }

    #[test]
    fn test_variant_reference_or_flag_counts_as_content() {
        let engine = builtin_engine();
        let mut entry = valid_entry("e1");
        entry["senses"] = json!([
            {"id": "e1_s1", "variant_ref": "base_s1"},
            {"id": "e1_s2", "is_variant": true}
        ]);
        assert!(run_rule(&engine, &entry, "R2.2.1").is_empty());
    }

    #[test]
    fn test_empty_gloss_outside_source_language() {
        let engine = engine_with(&ValidatorConfig {
            source_language: Some("seh".into()),
            ..ValidatorConfig::default()
        });
        let mut entry = valid_entry("e1");
        entry["senses"][0]["gloss"] = json!({"seh": "", "pt": "", "en": "word"});
        let findings = run_rule(&engine, &entry, "R2.2.1");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "$.senses[0].gloss.pt");
    }

    #[test]
    fn test_empty_definition_outside_source_language() {
        let engine = engine_with(&ValidatorConfig {
            source_language: Some("seh".into()),
            ..ValidatorConfig::default()
        });
        let mut entry = valid_entry("e1");
        entry["senses"] = json!([
            {"id": "e1_s1", "definition": {"en": "", "pt": "casa", "seh": ""}},
            {"id": "e1_s2", "gloss": {"en": "", "pt": "casa"}}
        ]);
        let findings = run_rule(&engine, &entry, "R2.2.1");
        let found: Vec<(&str, Priority)> = findings
            .iter()
            .map(|f| (f.path.as_str(), f.priority))
            .collect();
        assert_eq!(
            found,
            vec![
                ("$.senses[0].definition.en", Priority::Critical),
                ("$.senses[1].gloss.en", Priority::Critical)
            ]
        );
        assert!(findings[0].message.contains("definition in 'en' is empty"));
    }

    #[test]
    fn test_definition_source_language_exception() {
        let engine = engine_with(&ValidatorConfig {
            source_language: Some("seh".into()),
            ..ValidatorConfig::default()
        });
        let mut entry = valid_entry("e1");
        entry["senses"][0]["definition"] = json!({"seh": "", "en": "a word"});
        assert!(run_rule(&engine, &entry, "R2.2.2").is_empty());

        entry["senses"][0]["definition"] = json!({"seh": "", "en": ""});
        let findings = run_rule(&engine, &entry, "R2.2.2");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "$.senses[0].definition.en");
    }

    #[test]
    fn test_entry_source_language_overrides_project_setting() {
        let engine = builtin_engine();
        let mut entry = valid_entry("e1");
        entry["source_language"] = json!("seh");
        entry["senses"][0]["definition"] = json!({"seh": "", "en": "a word"});
        assert!(run_rule(&engine, &entry, "R2.2.2").is_empty());
    }

    #[test]
    fn test_definitions_of_subsenses_are_checked() {
        let engine = builtin_engine();
        let mut entry = valid_entry("e1");
        entry["senses"][0]["subsenses"] = json!([{"id": "e1_s1a", "definition": {"pt": ""}}]);
        let findings = run_rule(&engine, &entry, "R2.2.2");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "$.senses[0].subsenses[0].definition.pt");
    }

    fn nested(levels: usize) -> serde_json::Value {
        let mut sense = json!({"id": format!("level{levels}"), "definition": {"en": "x"}});
        for level in (0..levels).rev() {
            sense = json!({"id": format!("level{level}"), "definition": {"en": "x"}, "subsenses": [sense]});
        }
        sense
    }

    #[test]
    fn test_subsense_depth_limit() {
        let engine = builtin_engine();
        let mut entry = valid_entry("e1");

        entry["senses"] = json!([nested(3)]);
        assert!(run_rule(&engine, &entry, "R2.3.1").is_empty());

        entry["senses"] = json!([nested(5)]);
        let findings = run_rule(&engine, &entry, "R2.3.1");
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].path,
            "$.senses[0].subsenses[0].subsenses[0].subsenses[0].subsenses[0]"
        );
        assert!(findings[0].message.contains("depth 4"));
    }

    #[test]
    fn test_pos_consistency() {
        let engine = builtin_engine();
        let mut entry = valid_entry("e1");
        entry["part_of_speech"] = json!("Noun");
        entry["senses"] = json!([
            {"id": "e1_s1", "definition": {"en": "a"}, "part_of_speech": "Noun"},
            {"id": "e1_s2", "definition": {"en": "b"}, "part_of_speech": "Verb"},
            {"id": "e1_s3", "definition": {"en": "c"}}
        ]);
        let findings = run_rule(&engine, &entry, "R7.1.1");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "$.senses[1].part_of_speech");
        assert!(run_rule(&engine, &entry, "R7.1.2").is_empty());
    }

    #[test]
    fn test_conflicting_pos_requires_entry_pos() {
        let engine = builtin_engine();
        let mut entry = valid_entry("e1");
        entry["senses"] = json!([
            {"id": "e1_s1", "definition": {"en": "a"}, "part_of_speech": "Noun"},
            {"id": "e1_s2", "definition": {"en": "b"}, "part_of_speech": "Verb"}
        ]);
        let findings = run_rule(&engine, &entry, "R7.1.2");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("Noun, Verb"));

        entry["senses"][1]["part_of_speech"] = json!("Noun");
        assert!(run_rule(&engine, &entry, "R7.1.2").is_empty());
    }
}
