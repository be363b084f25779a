//! Dialog nodes and the identity-aware diff built on top of the generic engine.

use serde_json::Value;

mod diff;
mod kind;

pub use diff::{
    DialogPolicy, dialog_diff, dialog_diff_adds, dialog_diff_deletes, dialog_diff_updates,
    is_dialog_stop,
};
pub use kind::SdkKind;

pub const KIND_KEY: &str = "$kind";
pub const DESIGNER_KEY: &str = "$designer";
pub const DESIGNER_ID_KEY: &str = "id";

/// A borrowed view over a JSON object that carries `$kind`.
#[derive(Debug, Clone, Copy)]
pub struct DialogNode<'a> {
    value: &'a Value,
    kind: &'a str,
}

impl<'a> DialogNode<'a> {
    /// Returns `None` for anything that is not an object with a string `$kind`.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        let kind = value.as_object()?.get(KIND_KEY)?.as_str()?;
        Some(Self { value, kind })
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn kind_str(&self) -> &'a str {
        self.kind
    }

    pub fn kind(&self) -> SdkKind {
        SdkKind::parse(self.kind)
    }

    pub fn designer_id(&self) -> Option<String> {
        designer_id(self.value)
    }

    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.value.get(name)
    }

    pub fn field_str(&self, name: &str) -> Option<&'a str> {
        self.field(name).and_then(Value::as_str)
    }
}

/// True when `value` is an object carrying `$kind`.
pub fn is_dialog_node(value: &Value) -> bool {
    value.as_object().is_some_and(|map| map.contains_key(KIND_KEY))
}

/// Reads `$designer.id`. Numeric ids are read as their decimal string; empty
/// strings count as no id.
pub fn designer_id(value: &Value) -> Option<String> {
    match value.get(DESIGNER_KEY)?.get(DESIGNER_ID_KEY)? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Writes `$designer.id`, keeping any other designer metadata in place.
pub fn set_designer_id(value: &mut Value, id: &str) {
    let Some(map) = value.as_object_mut() else {
        return;
    };
    let designer = map
        .entry(DESIGNER_KEY)
        .or_insert_with(|| Value::Object(Default::default()));
    if !designer.is_object() {
        *designer = Value::Object(Default::default());
    }
    if let Some(designer) = designer.as_object_mut() {
        designer.insert(DESIGNER_ID_KEY.to_string(), Value::String(id.to_string()));
    }
}
