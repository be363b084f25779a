//! Inlining resource bodies into a dialog tree for editing, and back.
//!
//! The virtual form keeps every canonical field untouched and adds two shadow
//! objects to each node that owns resources:
//!
//! ```json
//! {
//!   "$kind": "Microsoft.ConfirmInput",
//!   "$designer": { "id": "107784" },
//!   "prompt": "${ConfirmInput_Prompt_107784()}",
//!   "_virtual_lg": { "prompt": "- Are you sure?" },
//!   "_virtual_lu": { "name": "ConfirmInput_Response_107784", "body": "- yes" }
//! }
//! ```
//!
//! Edits to the shadow bodies are turned into resource operations with
//! [`virtual_resource_changes`]; [`to_canonical`] drops the shadows again.

use crate::context::SyncContext;
use crate::diff::{Change, ChangeSet};
use crate::dialog::{DialogNode, dialog_diff, set_designer_id};
use crate::error::PathError;
use crate::path::{JsonPath, Visit, json_set, walk, walk_mut};
use crate::resource::{
    DialogResources, IdRegistry, Intent, IntentChanges, ResourceBatch, ResourceChanges, Template,
    TemplateChanges, TemplateField, TemplateRef, intent_pool, node_intent_name,
    node_template_name, single_template_ref, template_pool,
};
use serde_json::{Map, Value, json};
use tracing::debug;

pub const VIRTUAL_LG_KEY: &str = "_virtual_lg";
pub const VIRTUAL_LU_KEY: &str = "_virtual_lu";

/// The body shown for a reference whose template does not exist yet.
pub const MISSING_TEMPLATE_BODY: &str = "- ";

/// Returns a copy of `dialog` with resource bodies inlined into shadow objects.
///
/// Only fields holding exactly one reference get a shadow body; literal text is
/// left alone. Intent-owning nodes get a `_virtual_lu` entry whenever the dialog
/// has an intent collection, with a `null` body if the intent is missing.
pub fn to_virtual(dialog: &Value, ctx: &SyncContext<'_>) -> Value {
    let templates = template_pool(dialog, ctx);
    let intents = intent_pool(dialog, ctx);
    let intents = intents.as_deref();

    let mut virtual_dialog = dialog.clone();
    walk_mut(&mut virtual_dialog, &mut |_, value| {
        let Some(node) = DialogNode::from_value(value) else {
            return Visit::Continue;
        };

        let mut bodies = Map::new();
        for field in TemplateField::ALL {
            let Some(reference) = node.field_str(field.key()).and_then(single_template_ref)
            else {
                continue;
            };
            let body = templates
                .and_then(|pool| pool.iter().find(|t| t.name == reference.name))
                .map_or(MISSING_TEMPLATE_BODY, |t| t.body.as_str());
            bodies.insert(field.key().to_string(), Value::String(body.to_string()));
        }

        let intent = match intents {
            Some(pool) if node.kind().owns_intent() => node_intent_name(&node).map(|name| {
                let body = pool
                    .iter()
                    .find(|i| i.name == name)
                    .map(|i| Value::String(i.body.clone()));
                json!({ "name": name, "body": body })
            }),
            _ => None,
        };

        if let Some(map) = value.as_object_mut() {
            if !bodies.is_empty() {
                map.insert(VIRTUAL_LG_KEY.to_string(), Value::Object(bodies));
            }
            if let Some(intent) = intent {
                map.insert(VIRTUAL_LU_KEY.to_string(), intent);
            }
        }
        Visit::Continue
    });
    virtual_dialog
}

/// Returns a copy of `virtual_dialog` without shadow objects.
///
/// Every field listed in a node's `_virtual_lg` is set to the reference derived
/// from the node's current kind and designer id, so a node copied after
/// virtualization points at its own templates. Call arguments already on the
/// field are kept. Nodes without a designer id keep whatever their fields hold.
pub fn to_canonical(virtual_dialog: &Value) -> Value {
    let mut dialog = virtual_dialog.clone();
    walk_mut(&mut dialog, &mut |_, value| {
        let fields = derived_fields(value);
        if let Some(map) = value.as_object_mut() {
            for (field, reference) in fields {
                map.insert(field.key().to_string(), Value::String(reference));
            }
            map.remove(VIRTUAL_LG_KEY);
            map.remove(VIRTUAL_LU_KEY);
        }
        Visit::Continue
    });
    dialog
}

/// The references a node's virtualized fields should hold under its current
/// kind and designer id, keeping any call arguments.
fn derived_fields(value: &Value) -> Vec<(TemplateField, String)> {
    let Some(node) = DialogNode::from_value(value) else {
        return Vec::new();
    };
    virtual_fields(value)
        .filter_map(|field| {
            let name = node_template_name(&node, field)?;
            let arguments = node
                .field_str(field.key())
                .and_then(single_template_ref)
                .map(|reference| reference.arguments)
                .unwrap_or_default();
            Some((field, TemplateRef { name, arguments }.to_string()))
        })
        .collect()
}

fn virtual_fields(value: &Value) -> impl Iterator<Item = TemplateField> + '_ {
    value
        .get(VIRTUAL_LG_KEY)
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|shadow| shadow.keys())
        .filter_map(|key| TemplateField::from_key(key))
}

/// Reads the resources back out of a virtual tree, keyed by derived names.
///
/// Empty bodies are skipped, as are nodes without a designer id.
pub fn virtual_resources(virtual_dialog: &Value) -> DialogResources {
    let mut found = DialogResources::default();
    walk(virtual_dialog, &mut |_, value| {
        let Some(node) = DialogNode::from_value(value) else {
            return Visit::Continue;
        };

        if let Some(shadow) = node.field(VIRTUAL_LG_KEY).and_then(Value::as_object) {
            for (key, body) in shadow {
                let Some(field) = TemplateField::from_key(key) else {
                    continue;
                };
                let Some(body) = body.as_str().filter(|b| !b.is_empty()) else {
                    continue;
                };
                if let Some(name) = node_template_name(&node, field) {
                    found.templates.push(Template {
                        name,
                        body: body.to_string(),
                        parameters: Vec::new(),
                    });
                }
            }
        }

        if let Some(shadow) = node.field(VIRTUAL_LU_KEY) {
            let body = shadow
                .get("body")
                .and_then(Value::as_str)
                .filter(|b| !b.is_empty());
            if let (Some(name), Some(body)) = (node_intent_name(&node), body) {
                found.intents.push(Intent {
                    name,
                    body: body.to_string(),
                });
            }
        }

        Visit::Continue
    });
    found
}

/// Resource operations between two virtual trees, read from the shadow bodies.
///
/// No collections are consulted: the trees carry everything. Added nodes whose
/// designer id is already taken get a fresh one from `ctx`, exactly as
/// [`resource_changes`](crate::resource::resource_changes) does, and the
/// returned `dialog` carries the re-keyed copies. Without `curr`, every
/// resource in `prev` is reported as an add.
pub fn virtual_resource_changes(
    prev: &Value,
    curr: Option<&Value>,
    ctx: &SyncContext<'_>,
) -> Result<ResourceChanges, PathError> {
    let Some(curr) = curr else {
        let found = virtual_resources(prev);
        return Ok(ResourceChanges {
            lg: ResourceBatch {
                adds: found.templates,
                ..ResourceBatch::default()
            },
            lu: ResourceBatch {
                adds: found.intents,
                ..ResourceBatch::default()
            },
            nodes: ChangeSet::default(),
            dialog: prev.clone(),
        });
    };

    let diff = dialog_diff(prev, curr);
    let mut lg = TemplateChanges::default();
    let mut lu = IntentChanges::default();

    for update in &diff.updates {
        let before = virtual_resources(&prune(&update.previous_value, &update.path, &diff.deletes));
        let after = virtual_resources(&prune(&update.value, &update.path, &diff.adds));
        lg.extend(ResourceBatch::between(&before.templates, &after.templates));
        lu.extend(ResourceBatch::between(&before.intents, &after.intents));
    }
    for delete in &diff.deletes {
        let found = virtual_resources(&delete.value);
        lg.deletes.extend(found.templates.into_iter().map(|t| t.name));
        lu.deletes.extend(found.intents.into_iter().map(|i| i.name));
    }
    let mut ids = IdRegistry::collect(prev, curr);
    let mut added = Vec::with_capacity(diff.adds.len());
    for add in &diff.adds {
        let copy = rekey_virtual(&add.value, ctx, &mut ids);
        let found = virtual_resources(&copy);
        lg.adds.extend(found.templates);
        lu.adds.extend(found.intents);
        added.push(Change {
            path: add.path.clone(),
            value: copy,
        });
    }

    let dialog = json_set(curr, added.iter().map(|c| (c.path.clone(), c.value.clone())))?;
    debug!(
        templates = lg.len(),
        intents = lu.len(),
        "virtual resource changes"
    );
    Ok(ResourceChanges {
        lg: lg.deduplicated(),
        lu: lu.deduplicated(),
        nodes: ChangeSet {
            adds: added,
            deletes: diff.deletes,
            updates: diff.updates,
        },
        dialog,
    })
}

/// A copy of an added virtual subtree in which every node whose designer id is
/// taken carries a fresh one. Its references and intent shadow follow the new id.
fn rekey_virtual(subtree: &Value, ctx: &SyncContext<'_>, ids: &mut IdRegistry) -> Value {
    let mut copy = subtree.clone();
    walk_mut(&mut copy, &mut |_, value| {
        let Some(old_id) = DialogNode::from_value(value).and_then(|node| node.designer_id())
        else {
            return Visit::Continue;
        };
        let new_id = ids.claim(&old_id, ctx);
        if new_id == old_id {
            return Visit::Continue;
        }

        set_designer_id(value, &new_id);
        let fields = derived_fields(value);
        let intent = DialogNode::from_value(value)
            .filter(|node| node.kind().is_input())
            .and_then(|node| node_intent_name(&node));
        if let Some(map) = value.as_object_mut() {
            for (field, reference) in fields {
                map.insert(field.key().to_string(), Value::String(reference));
            }
            if let (Some(name), Some(shadow)) = (
                intent,
                map.get_mut(VIRTUAL_LU_KEY).and_then(Value::as_object_mut),
            ) {
                shadow.insert("name".to_string(), Value::String(name));
            }
        }
        Visit::Continue
    });
    copy
}

/// Blanks out nested nodes that were added or deleted, so their resources are
/// only counted once, by the add or delete itself.
fn prune(subtree: &Value, at: &JsonPath, nested: &[Change]) -> Value {
    let nested: Vec<JsonPath> = nested
        .iter()
        .filter_map(|change| change.path.strip_prefix(at))
        .filter(|relative| !relative.is_root())
        .collect();
    if nested.is_empty() {
        return subtree.clone();
    }

    let mut pruned = subtree.clone();
    walk_mut(&mut pruned, &mut |path, value| {
        if nested.contains(path) {
            *value = Value::Null;
            return Visit::Stop;
        }
        Visit::Continue
    });
    pruned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceStore;

    fn store() -> ResourceStore {
        ResourceStore::new()
            .with_templates(
                "main.en-us",
                vec![Template {
                    name: "ConfirmInput_Prompt_1".to_string(),
                    body: "- Sure?".to_string(),
                    parameters: vec![],
                }],
            )
            .with_intents(
                "main.en-us",
                vec![Intent {
                    name: "ConfirmInput_Response_1".to_string(),
                    body: "- yes".to_string(),
                }],
            )
    }

    fn confirm() -> Value {
        json!({
            "recognizer": "main.lu",
            "actions": [{
                "$kind": "Microsoft.ConfirmInput",
                "$designer": { "id": "1" },
                "prompt": "${ConfirmInput_Prompt_1()}",
                "invalidPrompt": "${ConfirmInput_InvalidPrompt_1()}",
                "unrecognizedPrompt": "- literal"
            }]
        })
    }

    #[test]
    fn shadows_hold_bodies_and_canonical_fields_keep_references() {
        let store = store();
        let ctx = SyncContext::builder(&store).build();
        let virtual_dialog = to_virtual(&confirm(), &ctx);
        let node = &virtual_dialog["actions"][0];

        assert_eq!(node["prompt"], json!("${ConfirmInput_Prompt_1()}"));
        assert_eq!(
            node[VIRTUAL_LG_KEY],
            json!({ "prompt": "- Sure?", "invalidPrompt": MISSING_TEMPLATE_BODY })
        );
        assert_eq!(
            node[VIRTUAL_LU_KEY],
            json!({ "name": "ConfirmInput_Response_1", "body": "- yes" })
        );
    }

    #[test]
    fn canonical_form_round_trips() {
        let store = store();
        let ctx = SyncContext::builder(&store).build();
        let dialog = confirm();
        assert_eq!(to_canonical(&to_virtual(&dialog, &ctx)), dialog);
    }

    #[test]
    fn canonical_form_rederives_references_from_identity() {
        let copied = json!({
            "$kind": "Microsoft.SendActivity",
            "$designer": { "id": "new" },
            "activity": "${SendActivity_old()}",
            "_virtual_lg": { "activity": "- hi" }
        });
        let canonical = to_canonical(&copied);
        assert_eq!(
            canonical,
            json!({
                "$kind": "Microsoft.SendActivity",
                "$designer": { "id": "new" },
                "activity": "${SendActivity_new()}"
            })
        );
    }

    #[test]
    fn shadow_edits_become_resource_updates() {
        let store = store();
        let ctx = SyncContext::builder(&store).build();
        let before = to_virtual(&confirm(), &ctx);
        let mut after = before.clone();
        after["actions"][0][VIRTUAL_LG_KEY]["prompt"] = json!("- Really?");
        after["actions"][0][VIRTUAL_LU_KEY]["body"] = json!("- yep");

        let changes = virtual_resource_changes(&before, Some(&after), &ctx).unwrap();
        assert_eq!(changes.lg.updates.len(), 1);
        assert_eq!(changes.lg.updates[0].name, "ConfirmInput_Prompt_1");
        assert_eq!(changes.lg.updates[0].body, "- Really?");
        assert_eq!(changes.lu.updates.len(), 1);
        assert_eq!(changes.lu.updates[0].body, "- yep");
        assert!(changes.lg.adds.is_empty() && changes.lg.deletes.is_empty());
    }
}
