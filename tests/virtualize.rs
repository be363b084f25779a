//! Tests for the virtual (inlined) dialog form.
mod common;
use common::*;
use dialog_sync::prelude::*;
use dialog_sync::virtualize::{MISSING_TEMPLATE_BODY, VIRTUAL_LG_KEY, VIRTUAL_LU_KEY, virtual_resources};
use serde_json::json;

#[test]
fn test_bodies_are_inlined_next_to_their_nodes() {
    let store = todo_store();
    let ctx = context(&store);
    let virtual_dialog = to_virtual(&todo_dialog(), &ctx);

    let confirm = &virtual_dialog["triggers"][0]["actions"][1];
    assert_eq!(confirm[VIRTUAL_LG_KEY], json!({ "prompt": "- Shall we start?" }));
    assert_eq!(
        confirm[VIRTUAL_LU_KEY],
        json!({ "name": "ConfirmInput_Response_107784", "body": "- yes\n- sure" })
    );

    let trigger = &virtual_dialog["triggers"][1];
    assert_eq!(trigger[VIRTUAL_LU_KEY]["name"], json!("Add"));
    assert!(trigger.get(VIRTUAL_LG_KEY).is_none());

    let text_input = &virtual_dialog["triggers"][1]["actions"][0];
    assert_eq!(text_input[VIRTUAL_LG_KEY].as_object().map(|m| m.len()), Some(4));
}

#[test]
fn test_missing_templates_get_a_placeholder() {
    let store = ResourceStore::new();
    let ctx = context(&store);
    let virtual_dialog = to_virtual(&todo_dialog(), &ctx);

    let send = &virtual_dialog["triggers"][0]["actions"][0];
    assert_eq!(send[VIRTUAL_LG_KEY]["activity"], json!(MISSING_TEMPLATE_BODY));
    // No intent collection, no intent shadow.
    assert!(virtual_dialog["triggers"][0]["actions"][1].get(VIRTUAL_LU_KEY).is_none());
}

#[test]
fn test_canonical_form_round_trips() {
    let store = todo_store();
    let ctx = context(&store);
    let dialog = todo_dialog();
    assert_eq!(to_canonical(&to_virtual(&dialog, &ctx)), dialog);
}

#[test]
fn test_canonical_form_keeps_call_arguments() {
    let store = todo_store();
    let ctx = context(&store);
    let mut dialog = todo_dialog();
    dialog["triggers"][0]["actions"][0]["activity"] = json!("${SendActivity_202664(user.name)}");

    let virtual_dialog = to_virtual(&dialog, &ctx);
    assert_eq!(
        virtual_dialog["triggers"][0]["actions"][0][VIRTUAL_LG_KEY]["activity"],
        json!("- Hi! I can keep your to-do list.")
    );
    assert_eq!(to_canonical(&virtual_dialog), dialog);
}

#[test]
fn test_virtual_tree_carries_the_same_resources() {
    let store = todo_store();
    let ctx = context(&store);
    let dialog = todo_dialog();

    let from_store = resolve_resources(&dialog, &ctx, None);
    let from_tree = virtual_resources(&to_virtual(&dialog, &ctx));

    let sorted = |mut templates: Vec<Template>| {
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        templates
    };
    assert_eq!(sorted(from_tree.templates), sorted(from_store.templates));
    assert_eq!(
        names(from_tree.intents.iter().map(|i| &i.name)),
        names(from_store.intents.iter().map(|i| &i.name))
    );
}

fn virtual_todo() -> serde_json::Value {
    let store = todo_store();
    let ctx = context(&store);
    to_virtual(&todo_dialog(), &ctx)
}

#[test]
fn test_edited_bodies_are_updates() {
    let store = todo_store();
    let ctx = context(&store);
    let prev = virtual_todo();
    let mut curr = prev.clone();
    curr["triggers"][0]["actions"][0][VIRTUAL_LG_KEY]["activity"] = json!("- Welcome back!");
    curr["triggers"][1][VIRTUAL_LU_KEY]["body"] = json!("- add {item}");

    let changes = virtual_resource_changes(&prev, Some(&curr), &ctx).unwrap();

    assert_eq!(changes.lg.updates, vec![template("SendActivity_202664", "- Welcome back!")]);
    assert_eq!(changes.lu.updates, vec![intent("Add", "- add {item}")]);
    assert!(changes.lg.adds.is_empty() && changes.lg.deletes.is_empty());
}

#[test]
fn test_pasted_virtual_node_brings_its_bodies() {
    let store = todo_store();
    let ctx = context(&store);
    let prev = virtual_todo();
    let mut pasted = prev["triggers"][0]["actions"][1].clone();
    pasted["$designer"]["id"] = json!("222222");
    let curr = json_insert(&prev, vec![(path("$.triggers[0].actions[2]"), pasted)]).unwrap();

    let changes = virtual_resource_changes(&prev, Some(&curr), &ctx).unwrap();
    assert_eq!(changes.lg.adds, vec![template("ConfirmInput_Prompt_222222", "- Shall we start?")]);
    assert_eq!(changes.lu.adds, vec![intent("ConfirmInput_Response_222222", "- yes\n- sure")]);

    let canonical = to_canonical(&changes.dialog);
    assert_eq!(
        canonical["triggers"][0]["actions"][2]["prompt"],
        json!("${ConfirmInput_Prompt_222222()}")
    );
    assert!(canonical["triggers"][0]["actions"][2].get(VIRTUAL_LU_KEY).is_none());
}

#[test]
fn test_removed_virtual_node_deletes_its_resources() {
    let store = todo_store();
    let ctx = context(&store);
    let prev = virtual_todo();
    let curr = json_remove(&prev, &path("$.triggers[0].actions[1]")).unwrap();

    let changes = virtual_resource_changes(&prev, Some(&curr), &ctx).unwrap();
    assert_eq!(changes.lg.deletes, vec!["ConfirmInput_Prompt_107784".to_string()]);
    assert_eq!(changes.lu.deletes, vec!["ConfirmInput_Response_107784".to_string()]);
}

#[test]
fn test_node_added_inside_an_updated_node_is_counted_once() {
    let store = todo_store();
    let ctx = context(&store);
    let prev = virtual_todo();
    let mut curr = prev.clone();
    curr["triggers"][1]["condition"] = json!("turn.ready");
    let pasted = json!({
        "$kind": "Microsoft.SendActivity",
        "$designer": { "id": "333333" },
        "activity": "${SendActivity_333333()}",
        "_virtual_lg": { "activity": "- Added!" }
    });
    let curr = json_insert(&curr, vec![(path("$.triggers[1].actions[1]"), pasted)]).unwrap();

    let changes = virtual_resource_changes(&prev, Some(&curr), &ctx).unwrap();
    assert_eq!(changes.lg.adds, vec![template("SendActivity_333333", "- Added!")]);
    assert!(changes.lg.updates.is_empty());
}

#[test]
fn test_without_a_current_tree_everything_is_an_add() {
    let store = todo_store();
    let ctx = context(&store);
    let prev = virtual_todo();
    let changes = virtual_resource_changes(&prev, None, &ctx).unwrap();
    assert_eq!(changes.lg.adds.len(), 6);
    assert_eq!(changes.lu.adds.len(), 3);
    assert!(changes.nodes.is_empty());
}

#[test]
fn test_pasted_virtual_node_with_a_taken_id_is_rekeyed() {
    let store = todo_store();
    let ctx = context(&store);
    let prev = virtual_todo();
    let greeting = prev["triggers"][0]["actions"][0].clone();
    let confirm = prev["triggers"][0]["actions"][1].clone();
    let curr = json_insert(
        &prev,
        vec![
            (path("$.triggers[0].actions[2]"), greeting),
            (path("$.triggers[0].actions[3]"), confirm),
        ],
    )
    .unwrap();

    let changes = virtual_resource_changes(&prev, Some(&curr), &ctx).unwrap();

    assert_eq!(
        names(changes.lg.adds.iter().map(|t| &t.name)),
        vec!["ConfirmInput_Prompt_n2", "SendActivity_n1"]
    );
    assert_eq!(changes.lu.adds, vec![intent("ConfirmInput_Response_n2", "- yes\n- sure")]);

    let actions = &changes.dialog["triggers"][0]["actions"];
    assert_eq!(actions[0], prev["triggers"][0]["actions"][0]);
    assert_eq!(actions[2]["$designer"]["id"], json!("n1"));
    assert_eq!(actions[2]["activity"], json!("${SendActivity_n1()}"));
    assert_eq!(actions[3]["prompt"], json!("${ConfirmInput_Prompt_n2()}"));
    assert_eq!(actions[3][VIRTUAL_LU_KEY]["name"], json!("ConfirmInput_Response_n2"));
    assert_eq!(actions[3][VIRTUAL_LG_KEY]["prompt"], json!("- Shall we start?"));
}
