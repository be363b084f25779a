//! Tests for the generic structural diff and the tree editing helpers.
mod common;
use common::*;
use dialog_sync::diff::{Comparison, diff_adds, diff_deletes, diff_updates, is_json_stop};
use dialog_sync::prelude::*;
use serde_json::{Value, json};

fn paths(changes: &[Change]) -> Vec<String> {
    changes.iter().map(|c| c.path.to_string()).collect()
}

#[test]
fn test_identical_trees_have_no_changes() {
    let tree = json!({ "a": [1, { "b": null }], "c": { "d": "x" } });
    assert!(diff(&tree, &tree, &JsonPolicy).is_empty());
}

#[test]
fn test_object_members_are_added_deleted_and_updated() {
    let prev = json!({ "a": 1, "b": { "c": 2 }, "gone": true });
    let curr = json!({ "a": 1, "b": { "c": 3 }, "d": 4 });
    let changes = diff(&prev, &curr, &JsonPolicy);

    assert_eq!(paths(&changes.adds), vec!["$.d"]);
    assert_eq!(paths(&changes.deletes), vec!["$.gone"]);
    assert_eq!(changes.updates.len(), 1);
    assert_eq!(changes.updates[0].path.to_string(), "$.b.c");
    assert_eq!(changes.updates[0].previous_value, json!(2));
    assert_eq!(changes.updates[0].value, json!(3));
}

#[test]
fn test_swapping_sides_swaps_adds_and_deletes() {
    let prev = json!({ "a": 1, "list": [1, 2] });
    let curr = json!({ "b": 2, "list": [1, 2, 3] });

    let forward = diff(&prev, &curr, &JsonPolicy);
    let backward = diff(&curr, &prev, &JsonPolicy);
    assert_eq!(forward.adds, backward.deletes);
    assert_eq!(forward.deletes, backward.adds);
    assert_eq!(diff_deletes(&prev, &curr, &JsonPolicy), diff_adds(&curr, &prev, &JsonPolicy));
}

#[test]
fn test_changed_list_element_is_an_update() {
    let updates = diff_updates(&json!([1, 2, 3]), &json!([1, 2, 4]), &JsonPolicy);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].path.to_string(), "$[2]");
    assert_eq!(updates[0].value, json!(4));
    assert_eq!(updates[0].previous_value, json!(3));

    let changes = diff(&json!([1, 2, 3]), &json!([1, 2, 4]), &JsonPolicy);
    assert!(changes.adds.is_empty() && changes.deletes.is_empty());
}

#[test]
fn test_appended_and_removed_list_elements() {
    let grown = diff(&json!([1, 2, 3]), &json!([1, 2, 3, 4]), &JsonPolicy);
    assert_eq!(paths(&grown.adds), vec!["$[3]"]);
    assert_eq!(grown.adds[0].value, json!(4));
    assert!(grown.deletes.is_empty() && grown.updates.is_empty());

    let shrunk = diff(&json!([1, 2, 3]), &json!([1, 2]), &JsonPolicy);
    assert_eq!(paths(&shrunk.deletes), vec!["$[2]"]);
    assert_eq!(shrunk.deletes[0].value, json!(3));
    assert!(shrunk.adds.is_empty() && shrunk.updates.is_empty());
}

#[test]
fn test_objects_inserted_into_a_list_are_found_at_any_position() {
    let base = vec![json!({ "a": 1 }), json!({ "b": 2 })];
    let new = json!({ "c": 3 });

    for index in 0..=base.len() {
        let mut items = base.clone();
        items.insert(index, new.clone());
        let prev = json!({ "items": base.clone() });
        let curr = json!({ "items": items });

        let changes = diff(&prev, &curr, &JsonPolicy);
        assert_eq!(paths(&changes.adds), vec![format!("$.items[{}]", index)]);
        assert_eq!(changes.adds[0].value, new);
        assert!(changes.deletes.is_empty(), "insert at {} reported deletes", index);
        assert!(changes.updates.is_empty(), "insert at {} reported updates", index);
    }
}

#[test]
fn test_repeated_values_stay_distinct() {
    let changes = diff(&json!(["a", "b"]), &json!(["a", "b", "a"]), &JsonPolicy);
    assert_eq!(paths(&changes.adds), vec!["$[2]"]);
}

#[test]
fn test_field_change_inside_a_list_element_is_addressed_below_it() {
    let prev = json!({ "items": [{ "id": 1, "name": "a" }, { "id": 2, "name": "b" }] });
    let curr = json!({ "items": [{ "id": 1, "name": "a" }, { "id": 2, "name": "B", "tag": "x" }] });
    let changes = diff(&prev, &curr, &JsonPolicy);

    assert_eq!(changes.updates.len(), 1);
    assert_eq!(changes.updates[0].path.to_string(), "$.items[1].name");
    assert_eq!(paths(&changes.adds), vec!["$.items[1].tag"]);
}

#[test]
fn test_null_and_shape_changes_are_leaves() {
    assert!(is_json_stop(Some(&json!(null)), Some(&json!({}))));
    assert!(is_json_stop(Some(&json!([])), Some(&json!({}))));
    assert!(!is_json_stop(Some(&json!({})), Some(&json!({ "a": 1 }))));

    let changes = diff(&json!({ "a": null }), &json!({ "a": { "b": 1 } }), &JsonPolicy);
    assert_eq!(changes.updates.len(), 1);
    assert_eq!(changes.updates[0].path.to_string(), "$.a");
    assert!(changes.adds.is_empty());
}

#[test]
fn test_closures_can_serve_as_policies() {
    // Treats everything under `meta` as one opaque value.
    let opaque_meta = |prev: &Value, curr: &Value, at: &JsonPath| {
        let plain = JsonPolicy.compare(prev, curr, at);
        let is_meta = at.segments().first() == Some(&PathSegment::Field("meta".to_string()));
        Comparison {
            is_stop: plain.is_stop || is_meta,
            ..plain
        }
    };

    let prev = json!({ "meta": { "rev": 1, "by": "a" }, "body": 1 });
    let curr = json!({ "meta": { "rev": 2, "by": "a" }, "body": 1 });

    let changes = diff(&prev, &curr, &opaque_meta);
    assert_eq!(changes.updates.len(), 1);
    assert_eq!(changes.updates[0].path.to_string(), "$.meta");

    let plain = diff(&prev, &curr, &JsonPolicy);
    assert_eq!(plain.updates[0].path.to_string(), "$.meta.rev");
}

#[test]
fn test_set_creates_missing_containers() {
    let tree = json!({ "a": {} });
    let updated = json_set(
        &tree,
        vec![(path("$.a.b[0].c"), json!(1)), (path("$.x"), json!("y"))],
    )
    .unwrap();
    assert_eq!(updated, json!({ "a": { "b": [{ "c": 1 }] }, "x": "y" }));
    assert_eq!(tree, json!({ "a": {} }));
}

#[test]
fn test_insert_splices_into_arrays() {
    let tree = json!({ "list": [1, 3] });
    let inserted = json_insert(&tree, vec![(path("$.list[1]"), json!(2))]).unwrap();
    assert_eq!(inserted, json!({ "list": [1, 2, 3] }));

    let appended = json_insert(&tree, vec![(path("$.list[2]"), json!(4))]).unwrap();
    assert_eq!(appended, json!({ "list": [1, 3, 4] }));
}

#[test]
fn test_insert_rejects_bad_targets() {
    let tree = json!({ "list": [1], "obj": {} });

    assert!(matches!(
        json_insert(&tree, vec![(path("$.list"), json!(0))]),
        Err(PathError::InsertNotIndexed(_))
    ));
    assert!(matches!(
        json_insert(&tree, vec![(path("$.obj[0]"), json!(0))]),
        Err(PathError::NotAnArray(_))
    ));
    assert!(matches!(
        json_insert(&tree, vec![(path("$.list[5]"), json!(0))]),
        Err(PathError::IndexOutOfBounds { index: 5, len: 1, .. })
    ));
}

#[test]
fn test_remove_splices_and_ignores_missing_paths() {
    let tree = json!({ "list": [1, 2, 3], "a": { "b": 1 } });
    assert_eq!(
        json_remove(&tree, &path("$.list[1]")).unwrap(),
        json!({ "list": [1, 3], "a": { "b": 1 } })
    );
    assert_eq!(json_remove(&tree, &path("$.a.b")).unwrap()["a"], json!({}));
    assert_eq!(json_remove(&tree, &path("$.nope.deeper")).unwrap(), tree);
    assert!(matches!(
        json_remove(&tree, &JsonPath::root()),
        Err(PathError::RemoveRoot)
    ));
}

#[test]
fn test_applying_a_diff_reproduces_the_target() {
    let prev = json!({ "a": 1, "b": { "c": [1, 2] }, "d": "old" });
    let curr = json!({ "a": 2, "b": { "c": [1, 2] }, "d": "new", "e": [true] });
    let changes = diff(&prev, &curr, &JsonPolicy);

    let writes = changes
        .adds
        .iter()
        .map(|c| (c.path.clone(), c.value.clone()))
        .chain(changes.updates.iter().map(|u| (u.path.clone(), u.value.clone())));
    assert_eq!(json_set(&prev, writes).unwrap(), curr);
}
