//! Tests for the rule application engine

#[cfg(test)]
mod engine_tests {
    use crate::test_utils::{engine_from_yaml, findings_of};
    use lexi_validate::{
        CustomCheck, CustomValidatorRegistry, Error, Finding, Priority, RuleError,
        RuleRepository, ValidationEngine, ValidationMode, ValidationOptions, ValidatorSettings,
    };
    use serde_json::{Value, json};

    fn rule(id: &str, body: &str) -> String {
        let body: String = body
            .lines()
            .map(|line| format!("    {}\n", line.trim()))
            .collect();
        format!("rules:\n  {id}:\n{body}")
    }

    fn required_senses(constraint: &str) -> String {
        rule(
            "S1",
            &format!(
                r#"name: Senses
category: sense_level
priority: critical
path: "$.senses"
condition: required
constraint: {constraint}
message_template: "senses: {{value}}""#
            ),
        )
    }

    #[test]
    fn test_required_missing_field_reports_once_at_path() {
        let engine = engine_from_yaml(&rule(
            "E1",
            r#"name: Entry id
category: entry_level
priority: critical
path: "id"
condition: required
constraint: { type: string, min_length: 1 }
message_template: "{key} is {value}""#,
        ));
        let result = engine.validate_record(&json!({"lexical_unit": {}}), ValidationMode::Save);
        let findings = findings_of(&result, "E1");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "$.id");
        assert_eq!(findings[0].message, "id is (missing)");
        assert_eq!(findings[0].value, Value::Null);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_required_missing_vs_empty_array() {
        let existence = engine_from_yaml(&required_senses("{ type: array }"));
        let non_empty = engine_from_yaml(&required_senses("{ type: array, min_items: 1 }"));
        let missing = json!({"id": "e1"});
        let empty = json!({"id": "e1", "senses": []});

        assert_eq!(existence.validate_record(&missing, ValidationMode::All).error_count(), 1);
        assert_eq!(non_empty.validate_record(&missing, ValidationMode::All).error_count(), 1);
        assert!(existence.validate_record(&empty, ValidationMode::All).is_valid());
        assert_eq!(non_empty.validate_record(&empty, ValidationMode::All).error_count(), 1);
    }

    #[test]
    fn test_required_over_wildcard_checks_existing_elements_only() {
        let engine = engine_from_yaml(&rule(
            "S2",
            r#"name: Sense id
category: sense_level
priority: critical
path: "$.senses[*].id"
condition: required
constraint: { type: string, min_length: 1 }
message_template: "bad sense id at {path}""#,
        ));
        assert!(
            engine
                .validate_record(&json!({"senses": []}), ValidationMode::Save)
                .is_valid()
        );
        assert!(engine.validate_record(&json!({}), ValidationMode::Save).is_valid());

        let result = engine.validate_record(
            &json!({"senses": [{"id": "s1"}, {"id": ""}, {"id": 7}]}),
            ValidationMode::Save,
        );
        let paths: Vec<&str> = result.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["$.senses[1].id", "$.senses[2].id"]);
        assert_eq!(result.errors()[0].message, "bad sense id at $.senses[1].id");
    }

    #[test]
    fn test_if_present_skips_missing_and_null() {
        let engine = engine_from_yaml(&rule(
            "H1",
            r#"name: Homograph
category: entry_level
priority: warning
path: "$.homograph_number"
condition: if_present
constraint: { type: number, minimum: 1 }
message_template: "homograph {value}""#,
        ));
        for record in [json!({}), json!({"homograph_number": null}), json!({"homograph_number": 2})] {
            assert_eq!(engine.validate_record(&record, ValidationMode::Save).error_count(), 0);
        }
        let result = engine.validate_record(&json!({"homograph_number": 0}), ValidationMode::Save);
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].message, "homograph 0");
        assert!(result.is_valid());
    }

    fn two_mode_rules() -> String {
        let save = rule(
            "M1",
            r#"name: Save only
category: entry_level
priority: critical
path: "$.id"
condition: required
constraint: { type: string }
message_template: "save"
applicability_mode: save
client_visible: false"#,
        );
        let draft = rule(
            "M2",
            r#"name: Draft only
category: entry_level
priority: critical
path: "$.id"
condition: required
constraint: { type: string }
message_template: "draft"
applicability_mode: draft"#,
        );
        format!("{save}{}", draft.trim_start_matches("rules:\n"))
    }

    fn fired(engine: &ValidationEngine, options: &ValidationOptions) -> Vec<String> {
        engine
            .validate_record_with(&json!({}), options)
            .iter()
            .map(|f| f.rule_id.clone())
            .collect()
    }

    #[test]
    fn test_applicability_mode_filters_rules() {
        let engine = engine_from_yaml(&two_mode_rules());
        let options = ValidationOptions::new;
        assert_eq!(fired(&engine, &options(ValidationMode::Save)), vec!["M1"]);
        assert_eq!(fired(&engine, &options(ValidationMode::Draft)), vec!["M2"]);
        assert!(fired(&engine, &options(ValidationMode::Delete)).is_empty());
        assert_eq!(fired(&engine, &options(ValidationMode::All)), vec!["M1", "M2"]);
    }

    #[test]
    fn test_client_visible_only_skips_internal_rules() {
        let engine = engine_from_yaml(&two_mode_rules());
        let options = ValidationOptions::new(ValidationMode::All).client_visible_only(true);
        assert_eq!(fired(&engine, &options), vec!["M2"]);

        let engine = engine_from_yaml(&two_mode_rules()).with_client_visible_only(true);
        let result = engine.validate_record(&json!({}), ValidationMode::All);
        assert_eq!(result.error_count(), 1);
    }

    #[test]
    fn test_disabled_rule_never_fires() {
        let engine = engine_from_yaml(&rule(
            "D1",
            r#"name: Disabled
category: entry_level
priority: critical
path: "$.id"
condition: required
constraint: { type: string }
message_template: "never"
enabled: false"#,
        ));
        assert!(engine.validate_record(&json!({}), ValidationMode::All).is_valid());
    }

    #[test]
    fn test_malformed_path_is_isolated() {
        let broken = rule(
            "P1",
            r#"name: Broken path
category: entry_level
priority: informational
path: "$.senses[abc]"
condition: required
constraint: { type: string }
message_template: "unused""#,
        );
        let healthy = rule(
            "P2",
            r#"name: Entry id
category: entry_level
priority: warning
path: "$.id"
condition: required
constraint: { type: string }
message_template: "id missing""#,
        );
        let engine = engine_from_yaml(&format!(
            "{broken}{}",
            healthy.trim_start_matches("rules:\n")
        ));

        let result = engine.validate_record(&json!({}), ValidationMode::Save);
        let broken = findings_of(&result, "P1");
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].priority, Priority::Critical);
        assert!(broken[0].message.starts_with("Rule 'P1' could not be applied"));
        assert_eq!(findings_of(&result, "P2").len(), 1);
    }

    const CUSTOM_RULES: &str = r#"
rules:
  C1:
    name: Exploding validator
    category: entry_level
    priority: informational
    path: "$"
    condition: custom
    custom_function: explode
    message_template: "unused"
  C2:
    name: Failing validator
    category: entry_level
    priority: warning
    path: "$"
    condition: custom
    custom_function: refuse
    message_template: "unused"
  C3:
    name: Echo validator
    category: entry_level
    priority: warning
    path: "$.senses[*]"
    condition: custom
    custom_function: echo
    message_template: "{key} at {path}: {detail}"
"#;

    fn custom_registry() -> CustomValidatorRegistry {
        let mut registry = CustomValidatorRegistry::new();
        registry.register("explode", |_: &CustomCheck<'_>| -> Result<Vec<Finding>, RuleError> {
            panic!("validator exploded")
        });
        registry.register("refuse", |_: &CustomCheck<'_>| {
            Err(RuleError::custom("refuse", "not today"))
        });
        registry.register("echo", |check: &CustomCheck<'_>| {
            Ok(check
                .matches
                .iter()
                .map(|m| check.finding(&m.path, m.value, "seen"))
                .collect())
        });
        registry
    }

    #[test]
    fn test_custom_validator_failures_become_critical_findings() {
        let engine = ValidationEngine::with_parts(
            RuleRepository::from_yaml_str(CUSTOM_RULES).unwrap(),
            custom_registry(),
            ValidatorSettings::default(),
        )
        .unwrap();

        let record = json!({"senses": [{"id": "s1"}, {"id": "s2"}]});
        let result = engine.validate_record(&record, ValidationMode::Save);

        let exploded = findings_of(&result, "C1");
        assert_eq!(exploded.len(), 1);
        assert_eq!(exploded[0].priority, Priority::Critical);
        assert!(exploded[0].message.contains("validator exploded"));

        let refused = findings_of(&result, "C2");
        assert_eq!(refused.len(), 1);
        assert_eq!(refused[0].priority, Priority::Critical);
        assert!(refused[0].message.contains("not today"));

        let echoed = findings_of(&result, "C3");
        assert_eq!(echoed.len(), 2);
        assert_eq!(echoed[0].message, "0 at $.senses[0]: seen");
        assert_eq!(echoed[1].priority, Priority::Warning);
    }

    #[test]
    fn test_unknown_custom_validator_fails_construction() {
        let err = ValidationEngine::with_parts(
            RuleRepository::from_yaml_str(CUSTOM_RULES).unwrap(),
            CustomValidatorRegistry::builtin(),
            ValidatorSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownCustomValidator { ref function_name, .. } if function_name == "explode"
        ));
    }

    #[test]
    fn test_reload_rules_swaps_rule_set() {
        let engine = engine_from_yaml(&required_senses("{ type: array }"));
        let record = json!({"id": "e1"});
        assert_eq!(engine.validate_record(&record, ValidationMode::All).error_count(), 1);

        let before = engine.rules();
        engine
            .reload_rules(RuleRepository::from_yaml_str(&rule(
                "X1",
                r#"name: Id
category: entry_level
priority: critical
path: "$.id"
condition: required
constraint: { type: string }
message_template: "id""#,
            ))
            .unwrap())
            .unwrap();

        // snapshots taken before the swap are unaffected
        assert!(before.get("S1").is_some());
        assert!(engine.rules().get("S1").is_none());
        assert!(engine.validate_record(&record, ValidationMode::All).is_valid());
    }

    #[test]
    fn test_reload_rejects_unknown_validators_and_keeps_old_rules() {
        let engine = engine_from_yaml(&required_senses("{ type: array }"));
        let err = engine
            .reload_rules(RuleRepository::from_yaml_str(CUSTOM_RULES).unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCustomValidator { .. }));
        assert!(engine.rules().get("S1").is_some());
    }

    #[test]
    fn test_record_set_results_are_independent() {
        let engine = engine_from_yaml(&required_senses("{ type: array, min_items: 1 }"));
        let records = vec![
            json!({"id": "ok", "senses": [{}]}),
            json!({"id": "bad"}),
            json!({"senses": [{}]}),
            json!({"id": "ok"}),
        ];
        let results = engine.validate_record_set(&records, ValidationMode::Save);
        let keys: Vec<&str> = results.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["#2", "bad", "ok", "ok#3"]);
        assert!(results["ok"].is_valid());
        assert!(!results["bad"].is_valid());
        assert!(results["#2"].is_valid());
        assert!(!results["ok#3"].is_valid());
    }

    #[test]
    fn test_record_set_keeps_every_record_when_ids_look_generated() {
        let engine = engine_from_yaml(&required_senses("{ type: array, min_items: 1 }"));
        let records = vec![
            json!({"id": "a", "senses": [{}]}),
            json!({"id": "a#2", "senses": [{}]}),
            json!({"id": "a"}),
        ];
        let results = engine.validate_record_set(&records, ValidationMode::Save);
        assert_eq!(results.len(), records.len());
        assert!(results["a"].is_valid());
        assert!(results["a#2"].is_valid());
        assert!(!results["a#2.1"].is_valid());
        assert!(results.values().any(lexi_validate::ValidationResult::has_critical_errors));
    }
}
