//! Constraint Checker
//!
//! Pure check of one value against one typed constraint. A value of the
//! wrong JSON type always fails; otherwise only the bounds the constraint
//! declares are enforced.

use serde_json::Value;

use crate::rules::{Constraint, StringConstraint};

fn within<T: PartialOrd>(n: T, min: Option<T>, max: Option<T>) -> bool {
    min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max)
}

fn check_string(s: &str, c: &StringConstraint) -> bool {
    let length = s.chars().count();
    if !within(length, c.min_length, c.max_length) {
        return false;
    }
    if let Some(pattern) = &c.pattern
        && !pattern.is_match(s)
    {
        return false;
    }
    if let Some(forbidden) = &c.not_pattern
        && forbidden.is_match(s)
    {
        return false;
    }
    true
}

/// Check `value` against `constraint`
pub fn check(value: &Value, constraint: &Constraint) -> bool {
    match constraint {
        Constraint::String(c) => value.as_str().is_some_and(|s| check_string(s, c)),
        Constraint::Array {
            min_items,
            max_items,
        } => value
            .as_array()
            .is_some_and(|items| within(items.len(), *min_items, *max_items)),
        Constraint::Object {
            min_properties,
            max_properties,
        } => value
            .as_object()
            .is_some_and(|obj| within(obj.len(), *min_properties, *max_properties)),
        Constraint::Number { minimum, maximum } => value
            .as_f64()
            .is_some_and(|n| within(n, *minimum, *maximum)),
        Constraint::Boolean => value.is_boolean(),
    }
}
