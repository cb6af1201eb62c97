use std::path::{Path, PathBuf};

use anyhow::Context;
use baise_config::BaiseConfig;
use baise_schema::SchemaRegistry;
use serde::Serialize;
use serde_json::Value;

use crate::cli::{GlobalFlags, SchemaCommands};
use crate::output::output;

/// One row of `baise schema list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub collection: &'static str,
    pub required: Vec<String>,
    pub unique_fields: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ExportSummary {
    pub dir: String,
    pub files: Vec<String>,
}

/// Handle `baise schema`.
pub fn handle(
    action: &SchemaCommands,
    config: &BaiseConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let registry = SchemaRegistry::global();
    match action {
        SchemaCommands::List => output(&list(registry)?, flags.format),
        SchemaCommands::Show { collection } => output(show(registry, collection)?, flags.format),
        SchemaCommands::Export { dir } => {
            let dir = dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.general.export_dir));
            output(&export(registry, &dir)?, flags.format)
        }
    }
}

pub fn list(registry: &SchemaRegistry) -> anyhow::Result<Vec<CollectionSummary>> {
    registry
        .list()
        .into_iter()
        .map(|collection| -> anyhow::Result<CollectionSummary> {
            let required = show(registry, collection)?
                .get("required")
                .and_then(Value::as_array)
                .map(|fields| {
                    fields
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default();
            Ok(CollectionSummary {
                collection,
                required,
                unique_fields: registry.unique_fields(collection)?,
            })
        })
        .collect()
}

pub fn show<'a>(registry: &'a SchemaRegistry, collection: &str) -> anyhow::Result<&'a Value> {
    registry.get(collection).with_context(|| {
        format!(
            "unknown collection '{collection}' (known: {})",
            registry.list().join(", ")
        )
    })
}

/// Write each schema to `<dir>/<collection>.schema.json`, creating `dir`.
pub fn export(registry: &SchemaRegistry, dir: &Path) -> anyhow::Result<ExportSummary> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let mut files = Vec::new();
    for collection in registry.list() {
        let path = dir.join(format!("{collection}.schema.json"));
        let mut body = serde_json::to_string_pretty(show(registry, collection)?)?;
        body.push('\n');
        std::fs::write(&path, body)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(collection, path = %path.display(), "schema exported");
        files.push(path.display().to_string());
    }

    Ok(ExportSummary {
        dir: dir.display().to_string(),
        files,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn list_reports_required_and_unique_fields() {
        let summaries = list(SchemaRegistry::global()).unwrap();
        assert_eq!(summaries.len(), 16);

        let customers = summaries
            .iter()
            .find(|s| s.collection == "customers")
            .unwrap();
        assert_eq!(customers.unique_fields, vec!["email"]);
        assert!(customers.required.contains(&"email".to_string()));

        let names: Vec<&str> = summaries.iter().map(|s| s.collection).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn show_unknown_collection_names_the_known_ones() {
        let err = show(SchemaRegistry::global(), "widgets").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("widgets"));
        assert!(message.contains("data_resources"));
    }

    #[test]
    fn export_writes_one_file_per_collection() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");
        let summary = export(SchemaRegistry::global(), &dir).unwrap();

        assert_eq!(summary.files.len(), 16);
        let written = std::fs::read_to_string(dir.join("tasks.schema.json")).unwrap();
        let schema: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(&schema, show(SchemaRegistry::global(), "tasks").unwrap());
        assert!(written.ends_with('\n'));
    }
}
