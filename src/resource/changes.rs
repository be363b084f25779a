use super::copy::{IdRegistry, copy_nodes};
use super::correct::correct_template_refs_where;
use super::resolve::{collect_resources, intent_pool, recognizer_kind, template_pool};
use super::{Intent, Named, Template, resolve_resources};
use crate::context::SyncContext;
use crate::diff::{Change, ChangeSet};
use crate::dialog::dialog_diff;
use crate::error::PathError;
use crate::path::{JsonPath, get_at, json_remove, json_set};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Add, update and delete operations on one kind of resource collection.
/// Deletes are carried by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBatch<T> {
    pub adds: Vec<T>,
    pub deletes: Vec<String>,
    pub updates: Vec<T>,
}

pub type TemplateChanges = ResourceBatch<Template>;
pub type IntentChanges = ResourceBatch<Intent>;

impl<T> Default for ResourceBatch<T> {
    fn default() -> Self {
        Self {
            adds: Vec::new(),
            deletes: Vec::new(),
            updates: Vec::new(),
        }
    }
}

impl<T: Named + Clone + PartialEq> ResourceBatch<T> {
    /// Diffs two resource lists by name.
    pub fn between(prev: &[T], curr: &[T]) -> Self {
        let before: AHashMap<&str, &T> = prev.iter().map(|r| (r.name(), r)).collect();
        let after: AHashSet<&str> = curr.iter().map(|r| r.name()).collect();

        let mut batch = Self::default();
        for item in curr {
            match before.get(item.name()) {
                None => batch.adds.push(item.clone()),
                Some(old) if *old != item => batch.updates.push(item.clone()),
                Some(_) => {}
            }
        }
        batch.deletes = prev
            .iter()
            .filter(|r| !after.contains(r.name()))
            .map(|r| r.name().to_string())
            .collect();
        batch
    }

    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.deletes.is_empty() && self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.adds.len() + self.deletes.len() + self.updates.len()
    }

    pub fn extend(&mut self, other: Self) {
        self.adds.extend(other.adds);
        self.deletes.extend(other.deletes);
        self.updates.extend(other.updates);
    }

    /// Keeps the first occurrence of every name in each list.
    pub fn deduplicated(self) -> Self {
        Self {
            adds: self
                .adds
                .into_iter()
                .unique_by(|r| r.name().to_string())
                .collect(),
            deletes: self.deletes.into_iter().unique().collect(),
            updates: self
                .updates
                .into_iter()
                .unique_by(|r| r.name().to_string())
                .collect(),
        }
    }
}

/// The resource operations implied by a dialog edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceChanges {
    pub lg: TemplateChanges,
    pub lu: IntentChanges,
    /// The node-level diff; added nodes carry their re-keyed copies.
    pub nodes: ChangeSet,
    /// The current dialog with every added node replaced by its re-keyed copy,
    /// and updated nodes referencing the templates written for them.
    pub dialog: Value,
}

/// Turns the edit `prev` → `curr` into template and intent operations.
///
/// - Updated nodes: the resources referenced on both sides are diffed by name.
///   When the recognizer changed kind between the trees, intents are not
///   compared for updated nodes. Fields whose template was added or updated
///   under a derived name are rewritten to reference it.
/// - Deleted nodes: every resource they referenced is deleted.
/// - Added nodes: copied with [`copy_nodes`]; their resources are added under
///   the names derived from their (possibly regenerated) identity.
///
/// Without `curr`, every resource `prev` references is reported as an add.
pub fn resource_changes(
    prev: &Value,
    curr: Option<&Value>,
    ctx: &SyncContext<'_>,
) -> Result<ResourceChanges, PathError> {
    let Some(curr) = curr else {
        let found = resolve_resources(prev, ctx, None);
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

    let prev_templates = template_pool(prev, ctx);
    let curr_templates = template_pool(curr, ctx);
    let prev_intents = intent_pool(prev, ctx);
    let curr_intents = intent_pool(curr, ctx);
    let intents_comparable = recognizer_kind(prev) == recognizer_kind(curr);
    if !intents_comparable {
        debug!("recognizer changed, intents of updated nodes are not compared");
    }

    let mut rekeyed: Vec<(&JsonPath, AHashSet<String>)> = Vec::new();
    for update in &diff.updates {
        // Nodes added or deleted inside an updated node are handled below.
        let before = without(&update.previous_value, &update.path, &diff.deletes)?;
        let after = without(&update.value, &update.path, &diff.adds)?;
        let before = collect_resources(&before, prev_templates, prev_intents.as_deref());
        let after = collect_resources(&after, curr_templates, curr_intents.as_deref());

        let templates = ResourceBatch::between(&before.templates, &after.templates);
        let written: AHashSet<String> = templates
            .adds
            .iter()
            .chain(&templates.updates)
            .map(|t| t.name.clone())
            .collect();
        if !written.is_empty() {
            rekeyed.push((&update.path, written));
        }
        lg.extend(templates);
        if intents_comparable {
            lu.extend(ResourceBatch::between(&before.intents, &after.intents));
        }
    }

    for delete in &diff.deletes {
        let found = collect_resources(&delete.value, prev_templates, prev_intents.as_deref());
        lg.deletes
            .extend(found.templates.into_iter().map(|t| t.name));
        lu.deletes.extend(found.intents.into_iter().map(|i| i.name));
    }

    let mut ids = IdRegistry::collect(prev, curr);
    let mut added = Vec::with_capacity(diff.adds.len());
    for add in &diff.adds {
        let copied = copy_nodes(curr, &add.path, ctx, &mut ids);
        lg.adds.extend(copied.templates);
        lu.adds.extend(copied.intents);
        added.push(Change {
            path: add.path.clone(),
            value: copied.nodes,
        });
    }

    // Updated nodes point at the templates written for them.
    let mut dialog = curr.clone();
    for (path, written) in &rekeyed {
        if let Some(node) = get_at(&dialog, path) {
            let corrected = correct_template_refs_where(node, |name| written.contains(name));
            dialog = json_set(&dialog, [((*path).clone(), corrected)])?;
        }
    }
    let dialog = json_set(&dialog, added.iter().map(|c| (c.path.clone(), c.value.clone())))?;
    let changes = ResourceChanges {
        lg: lg.deduplicated(),
        lu: lu.deduplicated(),
        nodes: ChangeSet {
            adds: added,
            deletes: diff.deletes,
            updates: diff.updates,
        },
        dialog,
    };

    debug!(
        templates = changes.lg.len(),
        intents = changes.lu.len(),
        nodes = changes.nodes.len(),
        "resource changes"
    );
    Ok(changes)
}

/// `subtree` (found at `at`) with the nested changes removed.
fn without(subtree: &Value, at: &JsonPath, nested: &[Change]) -> Result<Value, PathError> {
    let mut paths: Vec<JsonPath> = nested
        .iter()
        .filter_map(|change| change.path.strip_prefix(at))
        .filter(|relative| !relative.is_root())
        .collect();
    // Highest indices first, so earlier removals do not shift later ones.
    paths.sort_by(|a, b| b.cmp(a));

    let mut pruned = subtree.clone();
    for path in &paths {
        pruned = json_remove(&pruned, path)?;
    }
    Ok(pruned)
}
