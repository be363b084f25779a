//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the
//! dialog-sync crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use dialog_sync::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let prev: serde_json::Value = serde_json::from_str(&std::fs::read_to_string("prev.dialog")?)?;
//! let curr: serde_json::Value = serde_json::from_str(&std::fs::read_to_string("curr.dialog")?)?;
//!
//! let store = ResourceStore::from_file("resources.json")?;
//! let ctx = SyncContext::builder(&store).build();
//! let changes = resource_changes(&prev, Some(&curr), &ctx)?;
//!
//! println!("{} template and {} intent operations", changes.lg.len(), changes.lu.len());
//! # Ok(())
//! # }
//! ```

// Paths and tree editing
pub use crate::path::{JsonPath, PathSegment, get_at, has_at, json_insert, json_remove, json_set};

// Generic and dialog-aware diffing
pub use crate::dialog::{DialogNode, SdkKind, dialog_diff};
pub use crate::diff::{Change, ChangeSet, DiffPolicy, JsonPolicy, UpdateChange, diff};

// Resources and synchronization
pub use crate::context::{SyncContext, SyncContextBuilder};
pub use crate::resource::{
    Intent, ResourceChanges, ResourceResolver, ResourceStore, Template, copy_nodes,
    dialog_correct, resolve_resources, resource_changes,
};
pub use crate::virtualize::{to_canonical, to_virtual, virtual_resource_changes};

// Error types
pub use crate::error::{LoadError, PathError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
