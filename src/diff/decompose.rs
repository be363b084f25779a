use super::{ChangeSet, DiffPolicy, UpdateChange, diff};
use crate::path::JsonPath;

/// Breaks coarse updates down into the finest changes the policy allows.
///
/// An update whose two sides are still walkable under `policy` is re-diffed;
/// the nested adds, deletes and leaf updates are re-addressed below the
/// update's path. This keeps "element replaced" from hiding "one field inside
/// the element changed". An update at an N-level list position may turn into
/// an add, delete or update at level N+1.
pub fn deconstruct_updates(updates: Vec<UpdateChange>, policy: &dyn DiffPolicy) -> ChangeSet {
    let root = JsonPath::root();
    let mut results = ChangeSet::default();

    for item in updates {
        if policy
            .compare(&item.previous_value, &item.value, &root)
            .is_stop
        {
            results.updates.push(item);
            continue;
        }

        let nested = diff(&item.previous_value, &item.value, policy);
        let nested_updates = deconstruct_updates(nested.updates, policy);

        results.adds.extend(
            nested
                .adds
                .into_iter()
                .chain(nested_updates.adds)
                .map(|change| change.under(&item.path)),
        );
        results.deletes.extend(
            nested
                .deletes
                .into_iter()
                .chain(nested_updates.deletes)
                .map(|change| change.under(&item.path)),
        );
        results.updates.extend(
            nested_updates
                .updates
                .into_iter()
                .map(|change| change.under(&item.path)),
        );
    }

    results
}
