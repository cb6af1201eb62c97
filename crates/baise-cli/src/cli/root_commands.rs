use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Inspect and export collection schemas.
    Schema {
        #[command(subcommand)]
        action: SchemaCommands,
    },
    /// Check documents from a JSON file against a collection.
    Validate(ValidateArgs),
}

#[derive(Clone, Debug, Subcommand)]
pub enum SchemaCommands {
    /// List registered collections.
    List,
    /// Print the JSON Schema of one collection.
    Show {
        /// Collection name, e.g. `data_resources`.
        collection: String,
    },
    /// Write every schema to `<collection>.schema.json`.
    Export {
        /// Output directory (defaults to `general.export_dir`).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

/// Arguments for `baise validate`.
#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    /// Collection the documents belong to.
    pub collection: String,
    /// JSON file holding one document or an array of documents.
    pub file: PathBuf,
    /// Also reject references to documents not in the file.
    #[arg(long)]
    pub check_references: bool,
}
