//! The generic structural diff engine.
//!
//! Two JSON trees are compared under a pluggable [`DiffPolicy`]. The engine
//! walks the current tree, hands arrays over to list reconciliation and reports
//! each change once, at the outermost stop point that contains it.
//!
//! Deletions are computed as additions with the arguments swapped, which keeps
//! the two symmetric by construction.

use crate::path::{JsonPath, Visit, get_at, walk};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

mod decompose;
mod list;
mod policy;

pub use decompose::deconstruct_updates;
pub use list::{ListChanges, ListEntry, list_compare, list_diff, uniq_list};
pub use policy::{Comparison, DiffPolicy, JsonPolicy, is_json_stop, is_walkable};

/// An added or deleted value and where it lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub path: JsonPath,
    pub value: Value,
}

/// A value that exists on both sides but differs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateChange {
    pub path: JsonPath,
    pub value: Value,
    #[serde(rename = "previousValue")]
    pub previous_value: Value,
}

impl Change {
    /// Re-addresses the change below `prefix`.
    pub fn under(mut self, prefix: &JsonPath) -> Self {
        self.path = prefix.join(&self.path);
        self
    }
}

impl UpdateChange {
    pub fn under(mut self, prefix: &JsonPath) -> Self {
        self.path = prefix.join(&self.path);
        self
    }
}

/// The result of one diff call. A path appears in at most one of the lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub adds: Vec<Change>,
    pub deletes: Vec<Change>,
    pub updates: Vec<UpdateChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.deletes.is_empty() && self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.adds.len() + self.deletes.len() + self.updates.len()
    }
}

/// Computes adds, deletes and updates that turn `prev` into `curr`.
///
/// Why both an object walk and a list reconciliation? For an object, a key is
/// either present on both sides (compare the values) or on one side only (an
/// add or a delete). For a list, an index can shift when a sibling is inserted
/// or removed, so elements have to be compared across the whole list.
pub fn diff(prev: &Value, curr: &Value, policy: &dyn DiffPolicy) -> ChangeSet {
    let changes = ChangeSet {
        adds: diff_adds(prev, curr, policy),
        deletes: diff_deletes(prev, curr, policy),
        updates: diff_updates(prev, curr, policy),
    };
    trace!(
        adds = changes.adds.len(),
        deletes = changes.deletes.len(),
        updates = changes.updates.len(),
        "structural diff"
    );
    changes
}

pub fn diff_adds(prev: &Value, curr: &Value, policy: &dyn DiffPolicy) -> Vec<Change> {
    let mut results = Vec::new();

    walk(curr, &mut |path, value| {
        if let (Some(Value::Array(before)), Value::Array(after)) = (get_at(prev, path), value) {
            let nested = list_diff(before, after, policy);
            results.extend(nested.adds.into_iter().map(|change| change.under(path)));
            return Visit::Stop;
        }

        let comparison = policy.compare(prev, curr, path);
        if comparison.is_add && comparison.is_stop {
            results.push(Change {
                path: path.clone(),
                value: value.clone(),
            });
        }
        Visit::from(comparison.is_stop)
    });

    results
}

pub fn diff_deletes(prev: &Value, curr: &Value, policy: &dyn DiffPolicy) -> Vec<Change> {
    diff_adds(curr, prev, policy)
}

pub fn diff_updates(prev: &Value, curr: &Value, policy: &dyn DiffPolicy) -> Vec<UpdateChange> {
    let mut results = Vec::new();

    walk(curr, &mut |path, value| {
        let before = get_at(prev, path);
        if let (Some(Value::Array(before)), Value::Array(after)) = (before, value) {
            let nested = list_diff(before, after, policy);
            results.extend(nested.updates.into_iter().map(|change| change.under(path)));
            return Visit::Stop;
        }

        let comparison = policy.compare(prev, curr, path);
        // Only leaves report updates; an inner node's change shows up below it.
        if comparison.is_change && comparison.is_stop {
            if let Some(previous) = before {
                results.push(UpdateChange {
                    path: path.clone(),
                    value: value.clone(),
                    previous_value: previous.clone(),
                });
            }
        }
        Visit::from(comparison.is_stop)
    });

    results
}
