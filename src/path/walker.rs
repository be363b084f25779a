use super::{JsonPath, PathSegment};
use serde_json::Value;

/// What a visitor wants the walker to do after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the node's children.
    Continue,
    /// Skip the node's descendants.
    Stop,
}

impl From<bool> for Visit {
    /// `true` means stop, matching the convention of stop predicates.
    fn from(stop: bool) -> Self {
        if stop { Visit::Stop } else { Visit::Continue }
    }
}

/// Visits `root` and then every reachable descendant, depth first.
///
/// Object members are visited in map order and array elements by ascending
/// index, so the order is stable across runs for the same input.
pub fn walk<'a, F>(root: &'a Value, visitor: &mut F)
where
    F: FnMut(&JsonPath, &'a Value) -> Visit,
{
    let mut path = JsonPath::root();
    walk_node(&mut path, root, visitor);
}

fn walk_node<'a, F>(path: &mut JsonPath, value: &'a Value, visitor: &mut F)
where
    F: FnMut(&JsonPath, &'a Value) -> Visit,
{
    if visitor(path, value) == Visit::Stop {
        return;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(PathSegment::Field(key.clone()));
                walk_node(path, child, visitor);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(PathSegment::Index(index));
                walk_node(path, child, visitor);
                path.pop();
            }
        }
        _ => {}
    }
}

/// Like [`walk`], but hands out mutable access. Children are visited after the
/// visitor has had its chance to rewrite the node.
pub fn walk_mut<F>(root: &mut Value, visitor: &mut F)
where
    F: FnMut(&JsonPath, &mut Value) -> Visit,
{
    let mut path = JsonPath::root();
    walk_node_mut(&mut path, root, visitor);
}

fn walk_node_mut<F>(path: &mut JsonPath, value: &mut Value, visitor: &mut F)
where
    F: FnMut(&JsonPath, &mut Value) -> Visit,
{
    if visitor(path, value) == Visit::Stop {
        return;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                path.push(PathSegment::Field(key.clone()));
                walk_node_mut(path, child, visitor);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter_mut().enumerate() {
                path.push(PathSegment::Index(index));
                walk_node_mut(path, child, visitor);
                path.pop();
            }
        }
        _ => {}
    }
}
