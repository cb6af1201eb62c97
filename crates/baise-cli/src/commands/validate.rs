use anyhow::{Context, bail};
use baise_config::{BaiseConfig, StoreConfig};
use baise_schema::SchemaRegistry;
use baise_store::{DocumentStore, StoreError};
use serde::Serialize;
use serde_json::Value;

use crate::cli::{GlobalFlags, ValidateArgs};
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub collection: String,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub documents: Vec<DocumentReport>,
}

/// Outcome for one document, by position in the input file.
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Handle `baise validate`.
pub fn handle(
    args: &ValidateArgs,
    config: &BaiseConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", args.file.display()))?;

    let mut store_config = config.store.clone();
    store_config.check_references |= args.check_references;

    let report = check_documents(&args.collection, value, store_config)?;
    output(&report, flags.format)?;

    if report.invalid > 0 {
        bail!(
            "{} of {} documents failed validation",
            report.invalid,
            report.total
        );
    }
    Ok(())
}

/// Insert each document into a fresh store so uniqueness spans the batch.
///
/// A top-level array is treated as a list of documents; anything else is a
/// single document.
pub fn check_documents(
    collection: &str,
    value: Value,
    config: StoreConfig,
) -> anyhow::Result<ValidationReport> {
    SchemaRegistry::global().kind(collection)?;

    let documents = match value {
        Value::Array(items) => items,
        single => vec![single],
    };

    let mut store = DocumentStore::new(config);
    let reports: Vec<DocumentReport> = documents
        .into_iter()
        .enumerate()
        .map(|(index, doc)| match store.insert_value(collection, doc) {
            Ok(stored) => DocumentReport {
                index,
                id: stored.get("_id").and_then(Value::as_str).map(str::to_owned),
                valid: true,
                errors: Vec::new(),
            },
            Err(StoreError::Validation { errors, .. }) => DocumentReport {
                index,
                id: None,
                valid: false,
                errors,
            },
            Err(other) => DocumentReport {
                index,
                id: None,
                valid: false,
                errors: vec![other.to_string()],
            },
        })
        .collect();

    let valid = reports.iter().filter(|r| r.valid).count();
    tracing::debug!(collection, total = reports.len(), valid, "documents checked");

    Ok(ValidationReport {
        collection: collection.to_string(),
        total: reports.len(),
        valid,
        invalid: reports.len() - valid,
        documents: reports,
    })
}
