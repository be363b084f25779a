use super::naming::{TemplateField, node_intent_name, node_template_name};
use super::reference::single_template_ref;
use super::{Intent, Template};
use crate::context::SyncContext;
use crate::dialog::{DialogNode, KIND_KEY, SdkKind};
use crate::path::{JsonPath, Visit, get_at, walk};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

const GENERATOR_KEY: &str = "generator";
const RECOGNIZER_KEY: &str = "recognizer";
const TEMPLATE_FILE_EXT: &str = ".lg";
const INTENT_FILE_EXT: &str = ".lu";

/// The resources a (sub)tree actually references, keyed by the names derived
/// from the referencing nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogResources {
    pub templates: Vec<Template>,
    pub intents: Vec<Intent>,
}

/// Where a dialog's intents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerKind {
    /// Patterns embedded in the dialog's own `recognizer.intents`.
    Regex,
    /// An external collection; holds the file's base name (`todo` for `todo.lu`).
    Named(String),
    None,
}

pub fn recognizer_kind(dialog: &Value) -> RecognizerKind {
    match dialog.get(RECOGNIZER_KEY) {
        Some(Value::Object(recognizer))
            if recognizer.get(KIND_KEY).and_then(Value::as_str)
                == Some(SdkKind::RegexRecognizer.as_str()) =>
        {
            RecognizerKind::Regex
        }
        Some(Value::String(file)) => RecognizerKind::Named(base_name(file, INTENT_FILE_EXT)),
        _ => RecognizerKind::None,
    }
}

fn base_name(file: &str, ext: &str) -> String {
    file.strip_suffix(ext).unwrap_or(file).to_string()
}

/// Every template the dialog's generator collection holds.
pub(crate) fn template_pool<'r>(dialog: &Value, ctx: &SyncContext<'r>) -> Option<&'r [Template]> {
    let generator = dialog
        .get(GENERATOR_KEY)
        .and_then(Value::as_str)
        .map(|file| base_name(file, TEMPLATE_FILE_EXT));
    ctx.templates(generator.as_deref())
        .map(|collection| collection.templates.as_slice())
}

/// Every intent available to the dialog under its current recognizer.
pub(crate) fn intent_pool<'r>(dialog: &Value, ctx: &SyncContext<'r>) -> Option<Cow<'r, [Intent]>> {
    match recognizer_kind(dialog) {
        RecognizerKind::Regex => {
            let intents = dialog
                .get(RECOGNIZER_KEY)
                .and_then(|r| r.get("intents"))
                .and_then(Value::as_array)?
                .iter()
                .filter_map(|entry| {
                    Some(Intent {
                        name: entry.get("intent")?.as_str()?.to_string(),
                        body: entry
                            .get("pattern")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    })
                })
                .collect::<Vec<_>>();
            Some(Cow::Owned(intents))
        }
        RecognizerKind::Named(base) => ctx
            .intents(Some(&base))
            .map(|collection| Cow::Borrowed(collection.intents.as_slice())),
        RecognizerKind::None => None,
    }
}

/// Collects the resources referenced by `dialog`, or by the subtree at `at`.
///
/// Collections are selected from the dialog root (generator and recognizer),
/// then the subtree is walked. A template-bearing field contributes only when
/// it holds exactly one reference that resolves; the template is re-keyed
/// under the name derived from the node, which differs from the referenced
/// name for a copied node that has not been re-serialized yet.
pub fn resolve_resources(
    dialog: &Value,
    ctx: &SyncContext<'_>,
    at: Option<&JsonPath>,
) -> DialogResources {
    let subtree = match at {
        Some(path) => get_at(dialog, path),
        None => Some(dialog),
    };
    let Some(subtree) = subtree else {
        return DialogResources::default();
    };
    let intents = intent_pool(dialog, ctx);
    collect_resources(subtree, template_pool(dialog, ctx), intents.as_deref())
}

pub(crate) fn collect_resources(
    subtree: &Value,
    templates: Option<&[Template]>,
    intents: Option<&[Intent]>,
) -> DialogResources {
    let mut found = DialogResources::default();
    let intents = intents.filter(|pool| !pool.is_empty());

    walk(subtree, &mut |_, value| {
        let Some(node) = DialogNode::from_value(value) else {
            return Visit::Continue;
        };

        if let Some(pool) = templates {
            for field in TemplateField::ALL {
                let Some(reference) = node.field_str(field.key()).and_then(single_template_ref)
                else {
                    continue;
                };
                if let Some(template) = pool.iter().find(|t| t.name == reference.name) {
                    found.templates.push(Template {
                        name: node_template_name(&node, field).unwrap_or(reference.name),
                        ..template.clone()
                    });
                }
            }
        }

        if let Some(pool) = intents.filter(|_| node.kind().owns_intent()) {
            if let Some(intent) = node_intent_name(&node)
                .and_then(|name| pool.iter().find(|intent| intent.name == name))
            {
                found.intents.push(intent.clone());
            }
        }

        Visit::Continue
    });

    found
}
