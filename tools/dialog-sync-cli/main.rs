use clap::{Parser, Subcommand};
use dialog_sync::diff::{ChangeSet, JsonPolicy, diff};
use dialog_sync::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::fs;

/// Structural diff and resource synchronization for dialog trees
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print compact JSON instead of pretty-printed output
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Diff two JSON documents
    Diff {
        prev: String,
        curr: String,
        /// Lift changes to whole dialog nodes
        #[arg(short, long)]
        dialog: bool,
    },
    /// Compute the template and intent operations implied by a dialog edit
    Changes {
        prev: String,
        /// Omit to report every resource `prev` references as an add
        curr: Option<String>,
        #[command(flatten)]
        resources: ResourceArgs,
        /// Read resource bodies from the virtual shadows instead of a store
        #[arg(long = "virtual")]
        virtual_trees: bool,
    },
    /// Inline resource bodies into a dialog
    Virtualize {
        dialog: String,
        #[command(flatten)]
        resources: ResourceArgs,
    },
    /// Strip virtual shadows and re-derive template references
    Canonicalize { dialog: String },
}

#[derive(clap::Args, Debug)]
struct ResourceArgs {
    /// Path to a resource store JSON file
    #[arg(short, long)]
    store: Option<String>,
    #[arg(short, long, default_value = dialog_sync::context::DEFAULT_LOCALE)]
    locale: String,
    #[arg(long, default_value = dialog_sync::context::DEFAULT_DIALOG_ID)]
    dialog_id: String,
}

impl ResourceArgs {
    fn load_store(&self) -> ResourceStore {
        match &self.store {
            Some(path) => ResourceStore::from_file(path)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to load resources: {}", e))),
            None => ResourceStore::new(),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let compact = cli.compact;

    match cli.command {
        Command::Diff { prev, curr, dialog } => {
            let prev = read_json(&prev);
            let curr = read_json(&curr);
            let changes: ChangeSet = if dialog {
                dialog_diff(&prev, &curr)
            } else {
                diff(&prev, &curr, &JsonPolicy)
            };
            print_json(&changes, compact);
        }
        Command::Changes {
            prev,
            curr,
            resources,
            virtual_trees,
        } => {
            let prev = read_json(&prev);
            let curr = curr.map(|path| read_json(&path));
            let store = resources.load_store();
            let ctx = SyncContext::builder(&store)
                .with_locale(&resources.locale)
                .with_dialog_id(&resources.dialog_id)
                .build();
            let changes = if virtual_trees {
                virtual_resource_changes(&prev, curr.as_ref(), &ctx)
            } else {
                resource_changes(&prev, curr.as_ref(), &ctx)
            }
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to compute changes: {}", e)));
            print_json(&changes, compact);
        }
        Command::Virtualize { dialog, resources } => {
            let dialog = read_json(&dialog);
            let store = resources.load_store();
            let ctx = SyncContext::builder(&store)
                .with_locale(&resources.locale)
                .with_dialog_id(&resources.dialog_id)
                .build();
            print_json(&to_virtual(&dialog, &ctx), compact);
        }
        Command::Canonicalize { dialog } => {
            let dialog = read_json(&dialog);
            print_json(&to_canonical(&dialog), compact);
        }
    }
}

fn read_json(path: &str) -> Value {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read '{}': {}", path, e)));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse '{}': {}", path, e)))
}

fn print_json<T: Serialize>(value: &T, compact: bool) {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => exit_with_error(&format!("Failed to serialize output: {}", e)),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
