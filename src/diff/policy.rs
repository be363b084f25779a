use crate::path::{JsonPath, get_at};
use serde_json::Value;

/// The verdict a policy gives for one location of two trees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Comparison {
    /// Both sides hold a value here and the values differ.
    pub is_change: bool,
    /// Only the current side holds a value here.
    pub is_add: bool,
    /// Comparison treats this location as one atomic unit and does not descend.
    pub is_stop: bool,
}

/// Decides how two trees are compared at a given path.
///
/// Both roots are handed over together with the path so a policy can look at
/// surrounding context, not just the two values. Closures with the matching
/// signature are policies too.
pub trait DiffPolicy {
    fn compare(&self, prev: &Value, curr: &Value, path: &JsonPath) -> Comparison;
}

impl<F> DiffPolicy for F
where
    F: Fn(&Value, &Value, &JsonPath) -> Comparison,
{
    fn compare(&self, prev: &Value, curr: &Value, path: &JsonPath) -> Comparison {
        self(prev, curr, path)
    }
}

/// Plain structural comparison: objects and arrays are walked, anything else is a leaf.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPolicy;

impl DiffPolicy for JsonPolicy {
    fn compare(&self, prev: &Value, curr: &Value, path: &JsonPath) -> Comparison {
        let before = get_at(prev, path);
        let after = get_at(curr, path);
        Comparison {
            is_change: matches!((before, after), (Some(a), Some(b)) if a != b),
            is_add: before.is_none() && after.is_some(),
            is_stop: is_json_stop(before, after),
        }
    }
}

/// The generic stop rule. Stop when either side is not walkable (absent or a
/// scalar) or when one side is an array and the other an object.
pub fn is_json_stop(before: Option<&Value>, after: Option<&Value>) -> bool {
    match (before, after) {
        (Some(a), Some(b)) if is_walkable(a) && is_walkable(b) => a.is_array() != b.is_array(),
        _ => true,
    }
}

pub fn is_walkable(value: &Value) -> bool {
    value.is_object() || value.is_array()
}
