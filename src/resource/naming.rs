use crate::dialog::{DialogNode, SdkKind};

/// The node fields that may hold a template reference.
///
/// This is also the table of virtual slots: each field maps to the key of the
/// same name inside a node's `_virtual_lg` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateField {
    Prompt,
    UnrecognizedPrompt,
    InvalidPrompt,
    DefaultValueResponse,
    Activity,
}

impl TemplateField {
    pub const ALL: [TemplateField; 5] = [
        TemplateField::Prompt,
        TemplateField::UnrecognizedPrompt,
        TemplateField::InvalidPrompt,
        TemplateField::DefaultValueResponse,
        TemplateField::Activity,
    ];

    /// The field's key on the node.
    pub fn key(self) -> &'static str {
        match self {
            TemplateField::Prompt => "prompt",
            TemplateField::UnrecognizedPrompt => "unrecognizedPrompt",
            TemplateField::InvalidPrompt => "invalidPrompt",
            TemplateField::DefaultValueResponse => "defaultValueResponse",
            TemplateField::Activity => "activity",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// The part a field contributes to a template name; `activity` contributes nothing.
    fn name_part(self) -> Option<&'static str> {
        match self {
            TemplateField::Prompt => Some("Prompt"),
            TemplateField::UnrecognizedPrompt => Some("UnrecognizedPrompt"),
            TemplateField::InvalidPrompt => Some("InvalidPrompt"),
            TemplateField::DefaultValueResponse => Some("DefaultValueResponse"),
            TemplateField::Activity => None,
        }
    }
}

/// `SendActivity_202664`, `ConfirmInput_Prompt_107784`, ...
pub fn template_name(kind: &SdkKind, field: TemplateField, designer_id: &str) -> String {
    match field.name_part() {
        Some(part) => format!("{}_{}_{}", kind.short_name(), part, designer_id),
        None => format!("{}_{}", kind.short_name(), designer_id),
    }
}

/// The intent name an input node owns: `ConfirmInput_Response_107784`.
pub fn intent_name(kind: &SdkKind, designer_id: &str) -> String {
    format!("{}_Response_{}", kind.short_name(), designer_id)
}

/// The template name derived from the node's own identity. `None` without a designer id.
pub fn node_template_name(node: &DialogNode<'_>, field: TemplateField) -> Option<String> {
    let id = node.designer_id()?;
    Some(template_name(&node.kind(), field, &id))
}

/// The intent a node owns, if any. An intent trigger names its intent in its
/// `intent` field; inputs derive it from their identity.
pub fn node_intent_name(node: &DialogNode<'_>) -> Option<String> {
    let kind = node.kind();
    if kind == SdkKind::OnIntent {
        return node
            .field_str("intent")
            .filter(|name| !name.is_empty())
            .map(str::to_string);
    }
    if !kind.owns_intent() {
        return None;
    }
    let id = node.designer_id()?;
    Some(intent_name(&kind, &id))
}
