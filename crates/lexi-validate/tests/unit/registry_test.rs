//! Tests for the rule repository and document loading

#[cfg(test)]
mod registry_tests {
    use lexi_validate::rules::YamlRuleLoader;
    use lexi_validate::{Category, CustomValidatorRegistry, Error, Priority, RuleRepository};
    use tempfile::TempDir;

    const ID_RULE: &str = r#"
rules:
  A1:
    name: Entry id
    category: entry_level
    priority: critical
    path: "$.id"
    condition: required
    constraint: { type: string, min_length: 1 }
    message_template: "id missing"
"#;

    const LU_RULE: &str = r#"
rules:
  B1:
    name: Lexical unit
    category: entry_level
    priority: warning
    path: "$.lexical_unit"
    condition: required
    constraint: { type: object, min_properties: 1 }
    message_template: "lexical unit missing"
"#;

    #[test]
    fn test_builtin_rules_load() {
        let repository = RuleRepository::builtin().unwrap();
        assert!(!repository.is_empty());
        assert_eq!(repository.source(), "<builtin>");

        let presence = repository.get("R2.1.1").unwrap();
        assert_eq!(presence.priority, Priority::Critical);
        assert_eq!(
            presence.custom_function(),
            Some("sense_required_unless_variant")
        );
        assert!(repository.get("R0.0.0").is_none());
    }

    #[test]
    fn test_builtin_rules_use_only_registered_validators() {
        let repository = RuleRepository::builtin().unwrap();
        let registry = CustomValidatorRegistry::builtin();
        for name in repository.custom_function_names() {
            assert!(registry.contains(name), "unregistered validator {name}");
        }
        // every built-in validator is wired to a rule
        assert_eq!(repository.custom_function_names().len(), registry.len());
    }

    #[test]
    fn test_all_preserves_document_order() {
        let repository = RuleRepository::builtin().unwrap();
        let ids: Vec<&str> = repository.all().map(|(id, _)| id).collect();
        assert_eq!(ids.first(), Some(&"R1.1.1"));
        assert_eq!(ids.len(), repository.len());
        let position = |id: &str| ids.iter().position(|i| *i == id).unwrap();
        assert!(position("R1.1.2") < position("R2.1.1"));
        assert!(position("R2.1.1") < position("R9.1.1"));
    }

    #[test]
    fn test_categories_and_by_category() {
        let repository = RuleRepository::builtin().unwrap();
        let categories = repository.categories();
        assert!(categories.contains(&Category::SenseLevel));
        assert!(categories.contains(&Category::Relation));
        assert!(
            repository
                .by_category(Category::Relation)
                .iter()
                .all(|r| r.category == Category::Relation)
        );
    }

    #[test]
    fn test_directory_loads_in_file_name_order() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("b_lexical.yml"), LU_RULE).unwrap();
        std::fs::write(temp.path().join("a_identity.yaml"), ID_RULE).unwrap();
        std::fs::write(temp.path().join("notes.txt"), "not a rule file").unwrap();

        let repository = RuleRepository::load(temp.path()).unwrap();
        let ids: Vec<&str> = repository.all().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["A1", "B1"]);
    }

    #[test]
    fn test_duplicate_ids_across_documents_fail() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("one.yml"), ID_RULE).unwrap();
        std::fs::write(temp.path().join("two.yml"), ID_RULE).unwrap();

        let err = RuleRepository::load(temp.path()).unwrap_err();
        assert!(matches!(err, Error::DuplicateRule { ref rule_id, .. } if rule_id == "A1"));
    }

    #[test]
    fn test_empty_directory_fails() {
        let temp = TempDir::new().unwrap();
        let err = RuleRepository::load(temp.path()).unwrap_err();
        assert!(matches!(err, Error::Document { .. }));
    }

    #[test]
    fn test_missing_source_fails() {
        let err = YamlRuleLoader::new("/nonexistent/rules")
            .load_all_rules()
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_malformed_document_fails() {
        assert!(matches!(
            RuleRepository::from_yaml_str("rules: [1, 2"),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            RuleRepository::from_yaml_str("rules: []"),
            Err(Error::Document { .. })
        ));
        assert!(matches!(
            RuleRepository::from_yaml_str("rules: {}"),
            Err(Error::Document { .. })
        ));
    }

    #[test]
    fn test_disabled_rules_are_kept() {
        let yaml = ID_RULE.replace(
            "message_template: \"id missing\"",
            "message_template: \"id missing\"\n    enabled: false",
        );
        let repository = RuleRepository::from_yaml_str(&yaml).unwrap();
        assert!(!repository.get("A1").unwrap().enabled);
    }
}
