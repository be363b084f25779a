use super::correct::write_fields;
use super::naming::{TemplateField, intent_name, template_name};
use super::reference::{TemplateRef, single_template_ref};
use super::resolve::{intent_pool, template_pool};
use super::{Intent, Template};
use crate::context::SyncContext;
use crate::dialog::{DialogNode, designer_id, set_designer_id};
use crate::path::{JsonPath, Visit, get_at, walk, walk_mut};
use ahash::{AHashMap, AHashSet};
use serde_json::Value;
use tracing::{debug, warn};

const MAX_ID_ATTEMPTS: usize = 64;

/// A copied subtree with re-keyed identities, plus the resources it now owns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopiedNodes {
    pub nodes: Value,
    pub templates: Vec<Template>,
    pub intents: Vec<Intent>,
}

/// The designer ids in play while copying nodes into a tree.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    /// Ids a copied node may not keep: everything in the previous tree and
    /// anything appearing more than once in the current one.
    taken: AHashSet<String>,
    /// Every id seen on either side; fresh ids avoid all of them.
    known: AHashSet<String>,
}

impl IdRegistry {
    pub fn collect(prev: &Value, curr: &Value) -> Self {
        let prev_ids = designer_ids(prev);
        let mut counts: AHashMap<String, usize> = AHashMap::new();
        for id in designer_ids(curr) {
            *counts.entry(id).or_default() += 1;
        }

        let mut known: AHashSet<String> = prev_ids.iter().cloned().collect();
        known.extend(counts.keys().cloned());
        let mut taken: AHashSet<String> = prev_ids.into_iter().collect();
        taken.extend(
            counts
                .into_iter()
                .filter(|(_, count)| *count > 1)
                .map(|(id, _)| id),
        );

        Self { taken, known }
    }

    /// Keeps `current` when it is free, otherwise draws a fresh id.
    pub fn claim(&mut self, current: &str, ctx: &SyncContext<'_>) -> String {
        if !self.taken.contains(current) {
            self.taken.insert(current.to_string());
            return current.to_string();
        }

        let mut candidate = ctx.next_designer_id();
        for _ in 1..MAX_ID_ATTEMPTS {
            if !self.known.contains(&candidate) && !self.taken.contains(&candidate) {
                break;
            }
            candidate = ctx.next_designer_id();
        }
        if self.taken.contains(&candidate) {
            warn!(id = %candidate, "designer id generator keeps returning ids in use");
        }
        debug!(from = current, to = %candidate, "regenerated designer id");

        self.known.insert(candidate.clone());
        self.taken.insert(candidate.clone());
        candidate
    }
}

fn designer_ids(tree: &Value) -> Vec<String> {
    let mut ids = Vec::new();
    walk(tree, &mut |_, value| {
        if DialogNode::from_value(value).is_some() {
            ids.extend(designer_id(value));
        }
        Visit::Continue
    });
    ids
}

/// Copies the subtree at `at` out of `dialog`, giving every node an identity
/// of its own and re-keying the resources it references.
///
/// A template field that holds a single reference carries the referenced body
/// over; a field with literal text turns that text into the body. Either way
/// the field is rewritten to reference the newly derived name. Input nodes
/// re-key their intent the same way. An intent trigger keeps the intent it
/// names, which already exists in the collection.
pub fn copy_nodes(
    dialog: &Value,
    at: &JsonPath,
    ctx: &SyncContext<'_>,
    ids: &mut IdRegistry,
) -> CopiedNodes {
    let Some(subtree) = get_at(dialog, at) else {
        return CopiedNodes::default();
    };
    let templates = template_pool(dialog, ctx);
    let intents = intent_pool(dialog, ctx);
    let intents = intents.as_deref();

    let mut copied = CopiedNodes {
        nodes: subtree.clone(),
        ..CopiedNodes::default()
    };
    let CopiedNodes {
        nodes,
        templates: new_templates,
        intents: new_intents,
    } = &mut copied;

    walk_mut(nodes, &mut |_, value| {
        let Some(node) = DialogNode::from_value(value) else {
            return Visit::Continue;
        };
        let Some(old_id) = node.designer_id() else {
            return Visit::Continue;
        };
        let kind = node.kind();
        let new_id = ids.claim(&old_id, ctx);

        let mut rewrites = Vec::new();
        for field in TemplateField::ALL {
            let Some(text) = node.field_str(field.key()) else {
                continue;
            };
            let source = match single_template_ref(text) {
                Some(reference) => templates
                    .and_then(|pool| pool.iter().find(|t| t.name == reference.name))
                    .map(|t| (t.body.clone(), t.parameters.clone())),
                None if !text.trim().is_empty() => Some((text.to_string(), Vec::new())),
                None => None,
            };
            let Some((body, parameters)) = source else {
                continue;
            };
            let name = template_name(&kind, field, &new_id);
            rewrites.push((field, TemplateRef::new(name.clone()).to_string()));
            new_templates.push(Template {
                name,
                body,
                parameters,
            });
        }

        if kind.is_input() {
            let old_name = intent_name(&kind, &old_id);
            if let Some(intent) = intents.and_then(|pool| pool.iter().find(|i| i.name == old_name)) {
                new_intents.push(Intent {
                    name: intent_name(&kind, &new_id),
                    body: intent.body.clone(),
                });
            }
        }

        write_fields(value, rewrites);
        set_designer_id(value, &new_id);
        Visit::Continue
    });

    copied
}
