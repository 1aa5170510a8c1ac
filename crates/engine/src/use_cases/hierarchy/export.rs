//! Hierarchy export.

use std::path::PathBuf;
use std::sync::Arc;

use arangomig_domain::{
    validate_export_value, ExportDocument, ExportMetadata, HierarchyCollection, HierarchyDataset,
};
use chrono::SecondsFormat;
use serde_json::{json, Value};

use super::HierarchyError;
use crate::infrastructure::config::{file_timestamp, ExportConfig};
use crate::infrastructure::ports::{ClockPort, DocumentStore};

/// What a successful export wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub summary_path: PathBuf,
    pub metadata: ExportMetadata,
    /// Optional collections that were absent.
    pub warnings: Vec<String>,
}

/// Dump the seven hierarchy collections into one export file.
pub struct ExportHierarchy {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn ClockPort>,
    source_database: String,
    source_url: String,
}

impl ExportHierarchy {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn ClockPort>,
        source_database: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            source_database: source_database.into(),
            source_url: source_url.into(),
        }
    }

    pub async fn execute(&self, config: &ExportConfig) -> Result<ExportOutcome, HierarchyError> {
        let (dataset, mut warnings) = self.read_collections().await?;
        if dataset.count(HierarchyCollection::Categories) == 0
            && dataset.count(HierarchyCollection::Services) == 0
        {
            return Err(HierarchyError::NoData(
                "no service categories or services found".to_string(),
            ));
        }

        let now = self.clock.now();
        let document = ExportDocument::from_dataset(
            &dataset,
            &self.source_database,
            &self.source_url,
            now.to_rfc3339_opts(SecondsFormat::Millis, true),
            config.include_system_fields,
        );

        tokio::fs::create_dir_all(&config.output_dir).await?;
        let path = config.output_path();
        let body = if config.pretty_print {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        tokio::fs::write(&path, body).await?;
        tracing::info!(path = %path.display(), total = document.metadata.total_documents, "Export written");

        let written: Value = serde_json::from_str(&tokio::fs::read_to_string(&path).await?)?;
        let check = validate_export_value(&written)?;
        tracing::info!(records = check.records_checked, "Export self-check passed");
        warnings.extend(check.warnings);

        let summary_path = config
            .output_dir
            .join(format!("export_summary_{}.json", file_timestamp(now)));
        let summary = json!({
            "export": document.metadata,
            "timestamp": now.to_rfc3339_opts(SecondsFormat::Millis, true),
            "config": {
                "outputDir": config.output_dir.display().to_string(),
                "filename": config.filename,
                "includeSystemFields": config.include_system_fields,
                "prettyPrint": config.pretty_print,
            },
            "database": {
                "url": self.source_url,
                "name": self.source_database,
            },
        });
        tokio::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?).await?;

        Ok(ExportOutcome {
            path,
            summary_path,
            metadata: document.metadata,
            warnings,
        })
    }

    async fn read_collections(&self) -> Result<(HierarchyDataset, Vec<String>), HierarchyError> {
        let mut dataset = HierarchyDataset::new();
        let mut warnings = Vec::new();

        for collection in HierarchyCollection::ALL {
            if !self.store.collection_exists(collection.name()).await? {
                if collection.is_mandatory_for_export() {
                    return Err(HierarchyError::MissingCollection(collection.name().to_string()));
                }
                tracing::warn!(collection = %collection, "Collection does not exist, exporting empty list");
                warnings.push(format!("{collection} does not exist"));
                continue;
            }
            let records = self.store.all_documents(collection.name()).await?;
            tracing::info!(collection = %collection, count = records.len(), "Read collection");
            dataset.set(collection, records);
        }

        Ok((dataset, warnings))
    }
}
