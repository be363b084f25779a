//! Common test fixtures: a small to-do bot dialog and the resources it references.
use dialog_sync::context::SequentialIds;
use dialog_sync::prelude::*;
use serde_json::{Value, json};

pub const TEMPLATES_ID: &str = "todo.en-us";

/// A dialog with a greeting, a confirmation, and an intent trigger holding a
/// text input with all four prompt fields.
#[allow(dead_code)]
pub fn todo_dialog() -> Value {
    json!({
        "$kind": "Microsoft.AdaptiveDialog",
        "$designer": { "id": "433224" },
        "generator": "todo.lg",
        "recognizer": "todo.lu",
        "triggers": [
            {
                "$kind": "Microsoft.OnBeginDialog",
                "$designer": { "id": "376720" },
                "actions": [
                    {
                        "$kind": "Microsoft.SendActivity",
                        "$designer": { "id": "202664" },
                        "activity": "${SendActivity_202664()}"
                    },
                    {
                        "$kind": "Microsoft.ConfirmInput",
                        "$designer": { "id": "107784" },
                        "prompt": "${ConfirmInput_Prompt_107784()}",
                        "property": "turn.confirmed"
                    }
                ]
            },
            {
                "$kind": "Microsoft.OnIntent",
                "$designer": { "id": "064505" },
                "intent": "Add",
                "actions": [
                    {
                        "$kind": "Microsoft.TextInput",
                        "$designer": { "id": "96TcCU" },
                        "prompt": "${TextInput_Prompt_96TcCU()}",
                        "unrecognizedPrompt": "${TextInput_UnrecognizedPrompt_96TcCU()}",
                        "invalidPrompt": "${TextInput_InvalidPrompt_96TcCU()}",
                        "defaultValueResponse": "${TextInput_DefaultValueResponse_96TcCU()}",
                        "property": "dialog.item"
                    }
                ]
            }
        ]
    })
}

#[allow(dead_code)]
pub fn template(name: &str, body: &str) -> Template {
    Template {
        name: name.to_string(),
        body: body.to_string(),
        parameters: vec![],
    }
}

#[allow(dead_code)]
pub fn intent(name: &str, body: &str) -> Intent {
    Intent {
        name: name.to_string(),
        body: body.to_string(),
    }
}

/// The `todo.lg` and `todo.lu` collections for [`todo_dialog`].
#[allow(dead_code)]
pub fn todo_store() -> ResourceStore {
    ResourceStore::new()
        .with_templates(
            TEMPLATES_ID,
            vec![
                template("SendActivity_202664", "- Hi! I can keep your to-do list."),
                template("ConfirmInput_Prompt_107784", "- Shall we start?"),
                template("TextInput_Prompt_96TcCU", "- What should I add?"),
                template("TextInput_UnrecognizedPrompt_96TcCU", "- Sorry, what was that?"),
                template("TextInput_InvalidPrompt_96TcCU", "- That does not look like a to-do."),
                template("TextInput_DefaultValueResponse_96TcCU", "- I'll add 'groceries'."),
            ],
        )
        .with_intents(
            TEMPLATES_ID,
            vec![
                intent("Add", "- add a to-do\n- remind me to {item}"),
                intent("ConfirmInput_Response_107784", "- yes\n- sure"),
                intent("TextInput_Response_96TcCU", "- {item}"),
            ],
        )
}

/// A context with deterministic designer ids (`n1`, `n2`, ...).
#[allow(dead_code)]
pub fn context(store: &ResourceStore) -> SyncContext<'_> {
    SyncContext::builder(store)
        .with_id_generator(SequentialIds::new("n"))
        .build()
}

#[allow(dead_code)]
pub fn path(expr: &str) -> JsonPath {
    JsonPath::parse(expr).expect("test paths are well formed")
}

#[allow(dead_code)]
pub fn names<T: AsRef<str>>(items: impl IntoIterator<Item = T>) -> Vec<String> {
    let mut names: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
    names.sort();
    names
}
