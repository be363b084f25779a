//! # dialog-sync - Structural Diff and Resource Sync for Dialog Trees
//!
//! **dialog-sync** compares two versions of a declarative dialog tree (a JSON
//! document whose nodes carry a `$kind` and a `$designer.id`) and turns the
//! edit into operations on the resource collections the dialog references:
//! language-generation templates and language-understanding intents.
//!
//! ## Core Workflow
//!
//! 1.  **Diff**: [`diff::diff`] reports adds, deletes and updates between any two
//!     JSON trees, addressed by [`path::JsonPath`]. [`dialog::dialog_diff`] lifts
//!     those changes to whole dialog nodes.
//! 2.  **Resolve**: a [`context::SyncContext`] bundles a resource resolver, the
//!     locale, the dialog id and a designer id generator.
//! 3.  **Sync**: [`resource::resource_changes`] maps the node-level diff to template
//!     and intent operations, re-keying copied nodes so they never share
//!     resources with their originals.
//! 4.  **Edit in place** (optional): [`virtualize::to_virtual`] inlines resource
//!     bodies next to the nodes that own them, and
//!     [`virtualize::virtual_resource_changes`] reads edits straight out of two
//!     such trees.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dialog_sync::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let store = ResourceStore::from_file("resources.json")?;
//!     let ctx = SyncContext::builder(&store).with_locale("en-us").build();
//!
//!     let prev = json!({
//!         "$kind": "Microsoft.AdaptiveDialog",
//!         "generator": "main.lg",
//!         "triggers": [{
//!             "$kind": "Microsoft.OnBeginDialog",
//!             "$designer": { "id": "t1" },
//!             "actions": [{
//!                 "$kind": "Microsoft.SendActivity",
//!                 "$designer": { "id": "202664" },
//!                 "activity": "${SendActivity_202664()}"
//!             }]
//!         }]
//!     });
//!
//!     // Paste a copy of the greeting right after the original.
//!     let greeting = prev["triggers"][0]["actions"][0].clone();
//!     let slot = JsonPath::parse("$.triggers[0].actions[1]")?;
//!     let curr = json_insert(&prev, [(slot, greeting)])?;
//!
//!     let changes = resource_changes(&prev, Some(&curr), &ctx)?;
//!     for template in &changes.lg.adds {
//!         println!("add {} = {}", template.name, template.body);
//!     }
//!     println!("{}", serde_json::to_string_pretty(&changes.dialog)?);
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod dialog;
pub mod diff;
pub mod error;
pub mod path;
pub mod prelude;
pub mod resource;
pub mod virtualize;
