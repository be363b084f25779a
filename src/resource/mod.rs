//! Externally stored resources referenced from dialog trees, and the
//! computations that keep them in step with tree edits.

use crate::error::LoadError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

mod changes;
mod copy;
mod correct;
mod naming;
mod reference;
mod resolve;

pub use changes::{IntentChanges, ResourceBatch, ResourceChanges, TemplateChanges, resource_changes};
pub use copy::{CopiedNodes, IdRegistry, copy_nodes};
pub use correct::{correct_template_refs, dialog_correct};
pub use naming::{TemplateField, intent_name, node_intent_name, node_template_name, template_name};
pub use reference::{TemplateRef, extract_template_refs, single_template_ref};
pub use resolve::{DialogResources, RecognizerKind, recognizer_kind, resolve_resources};

pub(crate) use resolve::{intent_pool, template_pool};

/// A named text-generation template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub body: String,
    #[serde(default)]
    pub parameters: Vec<String>,
}

/// A named trigger-matching intent. Field names follow the `{Name, Body}` wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Body")]
    pub body: String,
}

/// Anything identified by a name inside its collection.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Template {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Intent {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateCollection {
    #[serde(default)]
    pub templates: Vec<Template>,
}

impl TemplateCollection {
    pub fn find(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentCollection {
    #[serde(default)]
    pub intents: Vec<Intent>,
}

impl IntentCollection {
    pub fn find(&self, name: &str) -> Option<&Intent> {
        self.intents.iter().find(|i| i.name == name)
    }
}

/// Looks resource collections up by their locale-qualified id, e.g. `main.en-us`.
///
/// An absent collection means "no resources"; it is never an error.
pub trait ResourceResolver {
    fn templates(&self, id: &str) -> Option<&TemplateCollection>;
    fn intents(&self, id: &str) -> Option<&IntentCollection>;
}

/// An in-memory [`ResourceResolver`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceStore {
    #[serde(default)]
    pub templates: AHashMap<String, TemplateCollection>,
    #[serde(default)]
    pub intents: AHashMap<String, IntentCollection>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `{ "templates": { "<id>": { "templates": [..] } }, "intents": { .. } }`.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn with_templates(mut self, id: &str, templates: Vec<Template>) -> Self {
        self.templates
            .insert(id.to_string(), TemplateCollection { templates });
        self
    }

    pub fn with_intents(mut self, id: &str, intents: Vec<Intent>) -> Self {
        self.intents.insert(id.to_string(), IntentCollection { intents });
        self
    }
}

impl ResourceResolver for ResourceStore {
    fn templates(&self, id: &str) -> Option<&TemplateCollection> {
        self.templates.get(id)
    }

    fn intents(&self, id: &str) -> Option<&IntentCollection> {
        self.intents.get(id)
    }
}
