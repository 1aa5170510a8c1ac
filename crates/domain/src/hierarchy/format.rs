//! Export file versions understood by the importer.
//!
//! Four historical layouts exist. Each is a variant of [`ImportFormat`];
//! [`ImportFormat::decode`] picks the variant from `metadata.exportVersion`
//! and the shape of `data`, and [`ImportFormat::into_dataset`] fills the
//! collections a version does not carry with empty lists.

use serde_json::Value;

use super::{HierarchyCollection, HierarchyDataset, Record};
use crate::error::DomainError;

/// Version tag written by the exporter.
pub const CURRENT_EXPORT_VERSION: &str = "4.0";

#[derive(Debug, Clone, PartialEq)]
pub enum ImportFormat {
    /// `data` is a bare array of categories.
    V1 { categories: Vec<Record> },
    /// Categories and services.
    V2 {
        categories: Vec<Record>,
        services: Vec<Record>,
    },
    /// Adds the category → service edges.
    V3 {
        categories: Vec<Record>,
        services: Vec<Record>,
        category_services: Vec<Record>,
    },
    /// All seven collections including translations.
    V4(HierarchyDataset),
}

impl ImportFormat {
    /// Decode a parsed export file.
    pub fn decode(document: &Value) -> Result<Self, DomainError> {
        let (Some(metadata), Some(data)) = (
            document.get("metadata").filter(|v| !v.is_null()),
            document.get("data").filter(|v| !v.is_null()),
        ) else {
            return Err(DomainError::validation(
                "Invalid import file structure - missing metadata or data",
            ));
        };

        let version = metadata.get("exportVersion").and_then(Value::as_str);
        let present = |c: HierarchyCollection| data.get(c.name()).is_some_and(is_truthy);

        match version {
            Some("4.0") => {
                let mut dataset = HierarchyDataset::new();
                for collection in HierarchyCollection::ALL {
                    dataset.set(collection, optional_records(data, collection)?);
                }
                Ok(Self::V4(dataset))
            }
            Some("3.0") if present(HierarchyCollection::CategoryServices) => Ok(Self::V3 {
                categories: required_records(data, HierarchyCollection::Categories)?,
                services: optional_records(data, HierarchyCollection::Services)?,
                category_services: optional_records(data, HierarchyCollection::CategoryServices)?,
            }),
            Some("2.0") if present(HierarchyCollection::Categories) => Ok(Self::V2 {
                categories: required_records(data, HierarchyCollection::Categories)?,
                services: optional_records(data, HierarchyCollection::Services)?,
            }),
            _ => match data {
                Value::Array(items) => Ok(Self::V1 {
                    categories: to_records(items, HierarchyCollection::Categories)?,
                }),
                _ => Err(DomainError::unsupported_format(format!(
                    "Invalid import file data structure - cannot determine format (exportVersion: {})",
                    version.unwrap_or("none")
                ))),
            },
        }
    }

    pub fn version(&self) -> &'static str {
        match self {
            Self::V1 { .. } => "1.0",
            Self::V2 { .. } => "2.0",
            Self::V3 { .. } => "3.0",
            Self::V4(_) => "4.0",
        }
    }

    pub fn into_dataset(self) -> HierarchyDataset {
        let dataset = HierarchyDataset::new();
        match self {
            Self::V1 { categories } => dataset.with(HierarchyCollection::Categories, categories),
            Self::V2 {
                categories,
                services,
            } => dataset
                .with(HierarchyCollection::Categories, categories)
                .with(HierarchyCollection::Services, services),
            Self::V3 {
                categories,
                services,
                category_services,
            } => dataset
                .with(HierarchyCollection::Categories, categories)
                .with(HierarchyCollection::Services, services)
                .with(HierarchyCollection::CategoryServices, category_services),
            Self::V4(dataset) => dataset,
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

fn required_records(data: &Value, collection: HierarchyCollection) -> Result<Vec<Record>, DomainError> {
    match data.get(collection.name()) {
        Some(Value::Array(items)) => to_records(items, collection),
        _ => Err(DomainError::validation(format!(
            "Import data collection {collection} is not an array"
        ))),
    }
}

fn optional_records(data: &Value, collection: HierarchyCollection) -> Result<Vec<Record>, DomainError> {
    match data.get(collection.name()) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => to_records(items, collection),
        Some(_) => Err(DomainError::validation(format!(
            "Import data collection {collection} is not an array"
        ))),
    }
}

fn to_records(items: &[Value], collection: HierarchyCollection) -> Result<Vec<Record>, DomainError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record.clone()),
            _ => Err(DomainError::validation(format!(
                "{collection} entry {index} is not an object"
            ))),
        })
        .collect()
}
