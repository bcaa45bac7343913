//! Rule Repository
//!
//! Immutable, ordered collection of compiled rules. Built once from one or
//! more rule documents and then only read, so a single instance can be shared
//! across threads behind an `Arc`.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::info;

use super::model::{Category, Rule};
use super::yaml_loader::{LoadedRule, YamlRuleLoader};
use crate::{Error, Result};

/// Rule document shipped with the crate
const BUILTIN_RULES: &str = include_str!("../../rules/entry_rules.yml");

/// Ordered, read-only rule set with lookup by id
#[derive(Debug, Clone, Default)]
pub struct RuleRepository {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
    source: String,
}

impl RuleRepository {
    /// Build a repository from loaded rules, rejecting duplicate ids
    pub fn from_loaded(loaded: Vec<LoadedRule>, source: impl Into<String>) -> Result<Self> {
        let mut repository = Self {
            rules: Vec::with_capacity(loaded.len()),
            index: HashMap::with_capacity(loaded.len()),
            source: source.into(),
        };
        for LoadedRule { rule, origin } in loaded {
            if repository.index.contains_key(&rule.id) {
                return Err(Error::DuplicateRule {
                    rule_id: rule.id,
                    file: origin,
                });
            }
            repository
                .index
                .insert(rule.id.clone(), repository.rules.len());
            repository.rules.push(rule);
        }
        info!(
            rules = repository.rules.len(),
            source = %repository.source,
            "Rule set loaded"
        );
        Ok(repository)
    }

    /// Load from a rule document file or a directory of documents
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loaded = YamlRuleLoader::new(path).load_all_rules()?;
        Self::from_loaded(loaded, path.display().to_string())
    }

    /// Load from a document held in memory
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let origin = PathBuf::from("<inline>");
        let loaded = YamlRuleLoader::load_str(content, &origin)?;
        Self::from_loaded(loaded, "<inline>")
    }

    /// The rule set shipped with the crate
    pub fn builtin() -> Result<Self> {
        let origin = PathBuf::from("<builtin>");
        let loaded = YamlRuleLoader::load_str(BUILTIN_RULES, &origin)?;
        Self::from_loaded(loaded, "<builtin>")
    }

    /// Get a rule by ID
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.index.get(id).map(|&i| &self.rules[i])
    }

    /// All rules in document order
    pub fn all(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules.iter().map(|r| (r.id.as_str(), r))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Distinct categories used by the rule set
    pub fn categories(&self) -> BTreeSet<Category> {
        self.rules.iter().map(|r| r.category).collect()
    }

    /// Get rules by category
    pub fn by_category(&self, category: Category) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Names of every custom validator the rule set calls
    pub fn custom_function_names(&self) -> BTreeSet<&str> {
        self.rules.iter().filter_map(Rule::custom_function).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Where the rules came from (path, `<inline>` or `<builtin>`)
    pub fn source(&self) -> &str {
        &self.source
    }
}
