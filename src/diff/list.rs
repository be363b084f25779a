use super::{Change, ChangeSet, DiffPolicy, UpdateChange, deconstruct_updates};
use crate::path::JsonPath;
use serde_json::Value;

/// An element of a list together with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub index: usize,
    pub value: Value,
}

/// Position-level changes between two lists.
///
/// Add indices refer to the current list, delete indices to the previous one,
/// update indices to both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListChanges {
    pub adds: Vec<ListEntry>,
    pub deletes: Vec<ListEntry>,
    pub updates: Vec<ListEntry>,
}

/// Tags every element with its occurrence count among equal elements, so
/// `[a, b, a]` becomes `[(1, a), (1, b), (2, a)]`. Repeated values stay
/// distinguishable instead of being merged.
pub fn uniq_list<'a, F>(list: &'a [Value], eq: &F) -> Vec<(usize, &'a Value)>
where
    F: Fn(&Value, &Value) -> bool,
{
    let mut seen: Vec<(&Value, usize)> = Vec::new();
    list.iter()
        .map(|item| {
            let occurrence = match seen.iter().position(|(value, _)| eq(value, item)) {
                Some(i) => {
                    seen[i].1 += 1;
                    seen[i].1
                }
                None => {
                    seen.push((item, 1));
                    1
                }
            };
            (occurrence, item)
        })
        .collect()
}

/// Compares two lists element by element under `eq`.
///
/// Elements without a counterpart (same occurrence, equal value) on the other
/// side are changes. When the same position changed on both sides it is an
/// update, otherwise it is a delete (previous side) or an add (current side).
///
/// There is no move detection: when the length changes and no position
/// coincides, a moved element shows up as a delete plus an add.
pub fn list_compare<F>(prev: &[Value], curr: &[Value], eq: F) -> ListChanges
where
    F: Fn(&Value, &Value) -> bool,
{
    let prev_uniq = uniq_list(prev, &eq);
    let curr_uniq = uniq_list(curr, &eq);

    let only_in = |left: &[(usize, &Value)], right: &[(usize, &Value)]| -> Vec<ListEntry> {
        left.iter()
            .enumerate()
            .filter(|(_, (occurrence, value))| {
                !right
                    .iter()
                    .any(|(other_occurrence, other)| occurrence == other_occurrence && eq(value, other))
            })
            .map(|(index, (_, value))| ListEntry {
                index,
                value: Value::clone(value),
            })
            .collect()
    };

    let prev_only = only_in(&prev_uniq, &curr_uniq);
    let curr_only = only_in(&curr_uniq, &prev_uniq);

    let is_prev_index = |index: usize| prev_only.iter().any(|entry| entry.index == index);
    let is_curr_index = |index: usize| curr_only.iter().any(|entry| entry.index == index);

    let updates = curr_only
        .iter()
        .filter(|entry| is_prev_index(entry.index))
        .cloned()
        .collect();
    let deletes = prev_only
        .iter()
        .filter(|entry| !is_curr_index(entry.index))
        .cloned()
        .collect();
    let adds = curr_only
        .iter()
        .filter(|entry| !is_prev_index(entry.index))
        .cloned()
        .collect();

    ListChanges {
        adds,
        deletes,
        updates,
    }
}

/// Diffs two lists under `policy`, addressing results as `[i]`.
///
/// Elements are equal when the policy sees no change between them. Updates are
/// then decomposed, so a changed field inside an element is reported at
/// `[i].field` rather than as a replacement of the whole element.
pub fn list_diff(prev: &[Value], curr: &[Value], policy: &dyn DiffPolicy) -> ChangeSet {
    let root = JsonPath::root();
    let changes = list_compare(prev, curr, |a, b| !policy.compare(a, b, &root).is_change);

    let adds: Vec<Change> = changes
        .adds
        .into_iter()
        .map(|ListEntry { index, value }| Change {
            path: root.index(index),
            value,
        })
        .collect();
    let deletes: Vec<Change> = changes
        .deletes
        .into_iter()
        .map(|ListEntry { index, value }| Change {
            path: root.index(index),
            value,
        })
        .collect();
    let updates: Vec<UpdateChange> = changes
        .updates
        .into_iter()
        .map(|ListEntry { index, value }| UpdateChange {
            path: root.index(index),
            value,
            previous_value: prev[index].clone(),
        })
        .collect();

    let nested = deconstruct_updates(updates, policy);

    ChangeSet {
        adds: adds.into_iter().chain(nested.adds).collect(),
        deletes: deletes.into_iter().chain(nested.deletes).collect(),
        updates: nested.updates,
    }
}
