use std::fmt;

/// The `$kind` discriminant of a dialog node.
///
/// Kinds the engine treats specially get their own variant; everything else is
/// carried verbatim in [`SdkKind::Other`] so no input is ever rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SdkKind {
    AdaptiveDialog,
    OnIntent,
    OnUnknownIntent,
    OnBeginDialog,
    OnConversationUpdateActivity,
    SendActivity,
    BeginDialog,
    EndDialog,
    IfCondition,
    SwitchCondition,
    Foreach,
    SetProperty,
    EditArray,
    AttachmentInput,
    ChoiceInput,
    ConfirmInput,
    DateTimeInput,
    NumberInput,
    TextInput,
    OAuthInput,
    RegexRecognizer,
    LuisRecognizer,
    Other(String),
}

const KNOWN_KINDS: &[(&str, SdkKind)] = &[
    ("Microsoft.AdaptiveDialog", SdkKind::AdaptiveDialog),
    ("Microsoft.OnIntent", SdkKind::OnIntent),
    ("Microsoft.OnUnknownIntent", SdkKind::OnUnknownIntent),
    ("Microsoft.OnBeginDialog", SdkKind::OnBeginDialog),
    (
        "Microsoft.OnConversationUpdateActivity",
        SdkKind::OnConversationUpdateActivity,
    ),
    ("Microsoft.SendActivity", SdkKind::SendActivity),
    ("Microsoft.BeginDialog", SdkKind::BeginDialog),
    ("Microsoft.EndDialog", SdkKind::EndDialog),
    ("Microsoft.IfCondition", SdkKind::IfCondition),
    ("Microsoft.SwitchCondition", SdkKind::SwitchCondition),
    ("Microsoft.Foreach", SdkKind::Foreach),
    ("Microsoft.SetProperty", SdkKind::SetProperty),
    ("Microsoft.EditArray", SdkKind::EditArray),
    ("Microsoft.AttachmentInput", SdkKind::AttachmentInput),
    ("Microsoft.ChoiceInput", SdkKind::ChoiceInput),
    ("Microsoft.ConfirmInput", SdkKind::ConfirmInput),
    ("Microsoft.DateTimeInput", SdkKind::DateTimeInput),
    ("Microsoft.NumberInput", SdkKind::NumberInput),
    ("Microsoft.TextInput", SdkKind::TextInput),
    ("Microsoft.OAuthInput", SdkKind::OAuthInput),
    ("Microsoft.RegexRecognizer", SdkKind::RegexRecognizer),
    ("Microsoft.LuisRecognizer", SdkKind::LuisRecognizer),
];

impl SdkKind {
    pub fn parse(raw: &str) -> Self {
        KNOWN_KINDS
            .iter()
            .find(|(name, _)| *name == raw)
            .map(|(_, kind)| kind.clone())
            .unwrap_or_else(|| SdkKind::Other(raw.to_string()))
    }

    /// The full `$kind` string, e.g. `Microsoft.SendActivity`.
    pub fn as_str(&self) -> &str {
        match self {
            SdkKind::Other(raw) => raw,
            known => KNOWN_KINDS
                .iter()
                .find(|(_, kind)| kind == known)
                .map(|(name, _)| *name)
                .unwrap_or_default(),
        }
    }

    /// The last dot-separated segment of the kind: `SendActivity`.
    pub fn short_name(&self) -> &str {
        let full = self.as_str();
        full.rsplit('.').next().unwrap_or(full)
    }

    pub fn is_input(&self) -> bool {
        matches!(
            self,
            SdkKind::AttachmentInput
                | SdkKind::ChoiceInput
                | SdkKind::ConfirmInput
                | SdkKind::DateTimeInput
                | SdkKind::NumberInput
                | SdkKind::TextInput
        )
    }

    /// Kinds that own an intent: the intent trigger and the input prompts.
    pub fn owns_intent(&self) -> bool {
        *self == SdkKind::OnIntent || self.is_input()
    }
}

impl From<&str> for SdkKind {
    fn from(raw: &str) -> Self {
        SdkKind::parse(raw)
    }
}

impl fmt::Display for SdkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
