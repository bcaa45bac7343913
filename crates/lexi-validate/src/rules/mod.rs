//! Rule Registry System
//!
//! Declarative rule definitions, their loader and the read-only repository.

pub mod model;
pub mod registry;
pub mod yaml_loader;

pub use model::{
    Category, Condition, Constraint, Priority, Rule, StringConstraint, ValidationMode,
};
pub use registry::RuleRepository;
pub use yaml_loader::{
    ConditionKind, ConstraintDefinition, LoadedRule, RuleDefinition, YamlRuleLoader,
};
