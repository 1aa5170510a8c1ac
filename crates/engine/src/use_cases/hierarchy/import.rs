//! Hierarchy import.
//!
//! Decode, validate, prepare the target, then write each collection in
//! dependency order. Records whose natural key is already stored are skipped,
//! so re-running an import only fills gaps.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use arangomig_domain::{
    natural_key, projection_for, validate_dataset, HierarchyCollection, HierarchyDataset,
    ImportFormat, Record, MAX_REPORTED_ISSUES,
};
use chrono::SecondsFormat;
use serde_json::Value;

use super::{prepare_target, verify_import, HierarchyError, VerificationReport};
use crate::infrastructure::config::ImportConfig;
use crate::infrastructure::ports::{ClockPort, DocumentStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionImportStats {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub format_version: &'static str,
    pub stats: BTreeMap<HierarchyCollection, CollectionImportStats>,
    /// `"<collection> <key>: <message>"` per failed write.
    pub errors: Vec<String>,
    /// Validation warnings (zero when validation was skipped).
    pub warnings: usize,
    pub verification: VerificationReport,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.stats.values().map(|s| s.imported).sum()
    }

    pub fn skipped(&self) -> usize {
        self.stats.values().map(|s| s.skipped).sum()
    }

    pub fn is_success(&self) -> bool {
        (self.imported() > 0 || self.skipped() > 0)
            && self.errors.is_empty()
            && self.verification.passed()
    }
}

pub struct ImportHierarchy {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn ClockPort>,
    database: String,
}

impl ImportHierarchy {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn ClockPort>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            database: database.into(),
        }
    }

    pub async fn execute(&self, config: &ImportConfig) -> Result<ImportReport, HierarchyError> {
        let raw = tokio::fs::read_to_string(&config.file).await?;
        let document: Value = serde_json::from_str(&raw)?;
        let format = ImportFormat::decode(&document)?;
        let format_version = format.version();
        tracing::info!(file = %config.file.display(), version = format_version, "Detected export format");

        let dataset = format.into_dataset();
        for (collection, count) in dataset.counts() {
            tracing::info!(collection = %collection, count, "Records in file");
        }
        if dataset.is_empty() {
            return Err(HierarchyError::NoData(
                "import file contains no records".to_string(),
            ));
        }

        let mut warnings = 0;
        if config.validate_before_import {
            let validation = validate_dataset(&dataset);
            log_issues(&validation.errors, |m| tracing::error!("{m}"));
            log_issues(&validation.warnings, |m| tracing::warn!("{m}"));
            if !validation.is_valid() {
                return Err(HierarchyError::ValidationFailed(validation.errors.len()));
            }
            warnings = validation.warnings.len();
            tracing::info!(warnings, "Validation passed");
        } else {
            tracing::warn!("Validation skipped");
        }

        prepare_target(
            self.store.as_ref(),
            &self.database,
            config.create_database,
            config.create_collections,
        )
        .await?;

        let now = self
            .clock
            .now()
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut stats = BTreeMap::new();
        let mut errors = Vec::new();
        for collection in HierarchyCollection::ALL {
            let collection_stats = self
                .import_collection(collection, &dataset, config, &now, &mut errors)
                .await;
            stats.insert(collection, collection_stats);
        }

        let verification = verify_import(self.store.as_ref(), &dataset).await;

        let report = ImportReport {
            format_version,
            stats,
            errors,
            warnings,
            verification,
        };
        tracing::info!(
            imported = report.imported(),
            skipped = report.skipped(),
            errors = report.errors.len(),
            verified = report.verification.passed(),
            "Import finished"
        );
        Ok(report)
    }

    async fn import_collection(
        &self,
        collection: HierarchyCollection,
        dataset: &HierarchyDataset,
        config: &ImportConfig,
        now: &str,
        errors: &mut Vec<String>,
    ) -> CollectionImportStats {
        let mut stats = CollectionImportStats::default();
        let records = dataset.records(collection);
        if records.is_empty() {
            return stats;
        }

        let mut known = self.existing_keys(collection).await;
        let mut pending: Vec<&Record> = Vec::new();
        for record in records {
            match natural_key(collection, record) {
                Some(key) if known.contains(&key) => stats.skipped += 1,
                Some(key) => {
                    known.insert(key);
                    pending.push(record);
                }
                None => pending.push(record),
            }
        }
        if stats.skipped > 0 {
            tracing::info!(collection = %collection, skipped = stats.skipped, "Skipping records already present");
        }

        let projection = projection_for(collection);
        for (batch_number, batch) in pending.chunks(config.batch_size.max(1)).enumerate() {
            for record in batch {
                let cleaned = if config.strict {
                    projection.clean_strict(record)
                } else {
                    projection.clean_lenient(record, now)
                };
                match self.store.insert(collection.name(), &cleaned).await {
                    Ok(_) => stats.imported += 1,
                    Err(e) => {
                        stats.failed += 1;
                        let key = natural_key(collection, record)
                            .unwrap_or_else(|| "<no key>".to_string());
                        tracing::error!(collection = %collection, key = %key, error = %e, "Insert failed");
                        errors.push(format!("{collection} {key}: {e}"));
                    }
                }
            }
            tracing::debug!(
                collection = %collection,
                batch = batch_number + 1,
                size = batch.len(),
                "Batch written"
            );
        }

        tracing::info!(
            collection = %collection,
            imported = stats.imported,
            skipped = stats.skipped,
            failed = stats.failed,
            "Collection imported"
        );
        stats
    }

    async fn existing_keys(&self, collection: HierarchyCollection) -> HashSet<String> {
        match self.store.all_documents(collection.name()).await {
            Ok(documents) => documents
                .iter()
                .filter_map(|d| natural_key(collection, d))
                .collect(),
            Err(e) => {
                tracing::warn!(collection = %collection, error = %e, "Could not read existing records");
                HashSet::new()
            }
        }
    }
}

fn log_issues(issues: &[String], log: impl Fn(&str)) {
    for issue in issues.iter().take(MAX_REPORTED_ISSUES) {
        log(issue);
    }
    if issues.len() > MAX_REPORTED_ISSUES {
        log(&format!("... and {} more", issues.len() - MAX_REPORTED_ISSUES));
    }
}
