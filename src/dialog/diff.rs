use super::{KIND_KEY, designer_id, is_dialog_node};
use crate::diff::{
    Change, ChangeSet, Comparison, DiffPolicy, UpdateChange, diff_adds, diff_deletes, diff_updates,
    is_json_stop,
};
use crate::path::{JsonPath, get_at};
use ahash::AHashSet;
use itertools::Itertools;
use serde_json::Value;
use tracing::debug;

/// Compares dialog trees node by node.
///
/// A node's fields are only compared with its counterpart's when both carry the
/// same `$kind` and, where both define one, the same designer id. Otherwise the
/// node is one atomic unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogPolicy;

impl DiffPolicy for DialogPolicy {
    fn compare(&self, prev: &Value, curr: &Value, path: &JsonPath) -> Comparison {
        let before = get_at(prev, path);
        let after = get_at(curr, path);
        Comparison {
            is_change: matches!((before, after), (Some(a), Some(b)) if a != b),
            is_add: before.is_none() && after.is_some(),
            is_stop: is_dialog_stop(before, after),
        }
    }
}

pub fn is_dialog_stop(before: Option<&Value>, after: Option<&Value>) -> bool {
    !same_kind(before, after) || !same_designer_id(before, after) || is_json_stop(before, after)
}

fn same_kind(before: Option<&Value>, after: Option<&Value>) -> bool {
    fn kind(value: Option<&Value>) -> Option<&Value> {
        value.and_then(|v| v.as_object()?.get(KIND_KEY))
    }
    kind(before) == kind(after)
}

fn same_designer_id(before: Option<&Value>, after: Option<&Value>) -> bool {
    match (before.and_then(designer_id), after.and_then(designer_id)) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Diffs two dialog trees with dialog nodes as the unit of change.
///
/// Changes below a node are reported as an update of the nearest enclosing
/// node. Adding or removing a whole node stays an add or a delete.
pub fn dialog_diff(prev: &Value, curr: &Value) -> ChangeSet {
    let adds = diff_adds(prev, curr, &DialogPolicy);
    let deletes = diff_deletes(prev, curr, &DialogPolicy);
    let updates = diff_updates(prev, curr, &DialogPolicy);

    let mut merged = ChangeSet::default();
    let mut lifted: Vec<UpdateChange> = updates
        .into_iter()
        .filter_map(|update| lift_update(prev, curr, update))
        .collect();

    for change in adds {
        match lift_add(prev, curr, change) {
            Lifted::Kept(change) => merged.adds.push(change),
            Lifted::Update(update) => lifted.push(update),
        }
    }
    for change in deletes {
        match lift_delete(prev, curr, change) {
            Lifted::Kept(change) => merged.deletes.push(change),
            Lifted::Update(update) => lifted.push(update),
        }
    }

    merged.updates = lifted.into_iter().unique_by(|u| u.path.clone()).collect();
    let updated: AHashSet<&JsonPath> = merged.updates.iter().map(|u| &u.path).collect();
    let adds = std::mem::take(&mut merged.adds);
    let deletes = std::mem::take(&mut merged.deletes);
    merged.adds = adds
        .into_iter()
        .filter(|c| !updated.contains(&c.path))
        .unique_by(|c| c.path.clone())
        .collect();
    merged.deletes = deletes
        .into_iter()
        .filter(|c| !updated.contains(&c.path))
        .unique_by(|c| c.path.clone())
        .collect();

    debug!(
        adds = merged.adds.len(),
        deletes = merged.deletes.len(),
        updates = merged.updates.len(),
        "dialog diff"
    );
    merged
}

pub fn dialog_diff_adds(prev: &Value, curr: &Value) -> Vec<Change> {
    dialog_diff(prev, curr).adds
}

pub fn dialog_diff_deletes(prev: &Value, curr: &Value) -> Vec<Change> {
    dialog_diff(prev, curr).deletes
}

pub fn dialog_diff_updates(prev: &Value, curr: &Value) -> Vec<UpdateChange> {
    dialog_diff(prev, curr).updates
}

enum Lifted {
    Kept(Change),
    Update(UpdateChange),
}

/// Walks up from `path` to the closest node in `tree`; the root when there is none.
fn nearest_node(tree: &Value, path: &JsonPath) -> JsonPath {
    let mut current = path.clone();
    while !current.is_root() {
        if get_at(tree, &current).is_some_and(is_dialog_node) {
            return current;
        }
        current = current.parent();
    }
    current
}

fn lift_add(prev: &Value, curr: &Value, change: Change) -> Lifted {
    if is_dialog_node(&change.value) {
        return Lifted::Kept(change);
    }
    let path = nearest_node(curr, &change.path);
    match (get_at(prev, &path), get_at(curr, &path)) {
        (Some(before), Some(after)) => Lifted::Update(UpdateChange {
            path,
            value: after.clone(),
            previous_value: before.clone(),
        }),
        (None, Some(after)) => Lifted::Kept(Change {
            path,
            value: after.clone(),
        }),
        _ => Lifted::Kept(change),
    }
}

fn lift_delete(prev: &Value, curr: &Value, change: Change) -> Lifted {
    if is_dialog_node(&change.value) {
        return Lifted::Kept(change);
    }
    let path = nearest_node(prev, &change.path);
    match (get_at(prev, &path), get_at(curr, &path)) {
        (Some(before), Some(after)) => Lifted::Update(UpdateChange {
            path,
            value: after.clone(),
            previous_value: before.clone(),
        }),
        (Some(before), None) => Lifted::Kept(Change {
            path,
            value: before.clone(),
        }),
        _ => Lifted::Kept(change),
    }
}

fn lift_update(prev: &Value, curr: &Value, update: UpdateChange) -> Option<UpdateChange> {
    if is_dialog_node(&update.value) {
        return Some(update);
    }
    let path = nearest_node(curr, &update.path);
    let before = get_at(prev, &path)?;
    let after = get_at(curr, &path)?;
    Some(UpdateChange {
        path,
        value: after.clone(),
        previous_value: before.clone(),
    })
}
