//! The hierarchy export document and its self-check.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{projection_for, HierarchyCollection, HierarchyDataset, CURRENT_EXPORT_VERSION};
use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub export_date: String,
    pub source_database: String,
    pub source_url: String,
    pub collections: Vec<String>,
    pub document_counts: BTreeMap<String, usize>,
    pub total_documents: usize,
    pub include_system_fields: bool,
    pub export_version: String,
}

/// `{ metadata, schemas, data }` as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub schemas: Map<String, Value>,
    pub data: Map<String, Value>,
}

impl ExportDocument {
    /// Assemble an export from raw store documents.
    ///
    /// Without `include_system_fields` each record is reduced to the clean
    /// projection. Records are sorted by the collection's sort keys either way.
    pub fn from_dataset(
        dataset: &HierarchyDataset,
        source_database: impl Into<String>,
        source_url: impl Into<String>,
        export_date: impl Into<String>,
        include_system_fields: bool,
    ) -> Self {
        let mut schemas = Map::new();
        let mut data = Map::new();
        let mut document_counts = BTreeMap::new();

        for collection in HierarchyCollection::ALL {
            let projection = projection_for(collection);
            let mut records: Vec<_> = if include_system_fields {
                dataset.records(collection).to_vec()
            } else {
                dataset
                    .records(collection)
                    .iter()
                    .map(|r| projection.project_for_export(r))
                    .collect()
            };
            projection.sort(&mut records);

            document_counts.insert(collection.name().to_string(), records.len());
            schemas.insert(collection.name().to_string(), projection.descriptor());
            data.insert(
                collection.name().to_string(),
                Value::Array(records.into_iter().map(Value::Object).collect()),
            );
        }

        let metadata = ExportMetadata {
            export_date: export_date.into(),
            source_database: source_database.into(),
            source_url: source_url.into(),
            collections: HierarchyCollection::ALL
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            total_documents: document_counts.values().sum(),
            document_counts,
            include_system_fields,
            export_version: CURRENT_EXPORT_VERSION.to_string(),
        };

        Self {
            metadata,
            schemas,
            data,
        }
    }
}

/// Outcome of a successful export self-check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportCheck {
    pub records_checked: usize,
    /// Optional collections absent from `data`.
    pub warnings: Vec<String>,
}

/// Re-check a written export: every `data` entry must be an array and every
/// record must carry its collection's required fields.
pub fn validate_export_value(document: &Value) -> Result<ExportCheck, DomainError> {
    if document.get("metadata").map_or(true, Value::is_null) {
        return Err(DomainError::validation("export is missing metadata"));
    }
    let Some(data) = document.get("data").and_then(Value::as_object) else {
        return Err(DomainError::validation("export is missing a data object"));
    };

    let mut check = ExportCheck::default();
    for collection in HierarchyCollection::ALL {
        let records = match data.get(collection.name()) {
            Some(Value::Array(records)) => records,
            Some(_) => {
                return Err(DomainError::validation(format!(
                    "{collection} data is not an array"
                )))
            }
            None if collection.is_mandatory_for_export() => {
                return Err(DomainError::validation(format!(
                    "{collection} data is missing"
                )))
            }
            None => {
                check
                    .warnings
                    .push(format!("{collection} is not present in export"));
                continue;
            }
        };

        let projection = projection_for(collection);
        for (index, record) in records.iter().enumerate() {
            let Value::Object(record) = record else {
                return Err(DomainError::validation(format!(
                    "{collection}[{index}] is not an object"
                )));
            };
            let missing = projection.missing_fields(record);
            if !missing.is_empty() {
                return Err(DomainError::validation(format!(
                    "{collection}[{index}] is missing required fields: {}",
                    missing.join(", ")
                )));
            }
        }
        check.records_checked += records.len();
    }

    Ok(check)
}
