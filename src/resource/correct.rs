use super::naming::{TemplateField, node_template_name};
use super::reference::{TemplateRef, single_template_ref};
use crate::dialog::{DialogNode, dialog_diff_adds};
use crate::error::PathError;
use crate::path::{Visit, json_set, walk_mut};
use serde_json::Value;

/// Returns a copy of `subtree` whose template references point at the names
/// derived from each node's current kind and designer id.
///
/// Only pure references are rewritten; literal text and nodes without a
/// designer id are left as they are. Call arguments are kept.
pub fn correct_template_refs(subtree: &Value) -> Value {
    correct_template_refs_where(subtree, |_| true)
}

/// Like [`correct_template_refs`], limited to references whose derived name
/// satisfies `rekeyed`.
pub(crate) fn correct_template_refs_where<F>(subtree: &Value, rekeyed: F) -> Value
where
    F: Fn(&str) -> bool,
{
    let mut corrected = subtree.clone();
    walk_mut(&mut corrected, &mut |_, value| {
        let Some(node) = DialogNode::from_value(value) else {
            return Visit::Continue;
        };
        let rewrites: Vec<(TemplateField, String)> = TemplateField::ALL
            .into_iter()
            .filter_map(|field| {
                let reference = node.field_str(field.key()).and_then(single_template_ref)?;
                let name = node_template_name(&node, field).filter(|name| rekeyed(name))?;
                let expected = TemplateRef {
                    name,
                    arguments: reference.arguments,
                };
                Some((field, expected.to_string()))
            })
            .collect();
        write_fields(value, rewrites);
        Visit::Continue
    });
    corrected
}

/// Corrects template references inside every node added between `prev` and
/// `curr`, returning the fixed-up `curr`.
pub fn dialog_correct(prev: &Value, curr: &Value) -> Result<Value, PathError> {
    let fixes = dialog_diff_adds(prev, curr)
        .into_iter()
        .map(|add| {
            let corrected = correct_template_refs(&add.value);
            (add.path, corrected)
        })
        .collect::<Vec<_>>();
    json_set(curr, fixes)
}

pub(crate) fn write_fields(node: &mut Value, fields: Vec<(TemplateField, String)>) {
    if let Some(map) = node.as_object_mut() {
        for (field, text) in fields {
            map.insert(field.key().to_string(), Value::String(text));
        }
    }
}
