//! Category → service → translation hierarchy.
//!
//! Seven collections make up the hierarchy. Their names, kinds, dependency
//! order and edge endpoints live on [`HierarchyCollection`]; per-collection
//! field rules live in the projection table (`projection.rs`).

mod export;
mod format;
mod projection;
mod validation;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::schema::CollectionKind;

pub use export::{validate_export_value, ExportCheck, ExportDocument, ExportMetadata};
pub use format::{ImportFormat, CURRENT_EXPORT_VERSION};
pub use projection::{compare_values, projection_for, CollectionProjection, FieldSpec};
pub use validation::{validate_dataset, ValidationReport, MAX_REPORTED_ISSUES};

/// A stored document or edge.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HierarchyCollection {
    Categories,
    Services,
    CategoryServices,
    CategoryTranslations,
    CategoryTranslationEdges,
    ServiceTranslations,
    ServiceTranslationEdges,
}

impl HierarchyCollection {
    /// All collections, parents before children and edges.
    pub const ALL: [Self; 7] = [
        Self::Categories,
        Self::Services,
        Self::CategoryServices,
        Self::CategoryTranslations,
        Self::CategoryTranslationEdges,
        Self::ServiceTranslations,
        Self::ServiceTranslationEdges,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Categories => "serviceCategories",
            Self::Services => "services",
            Self::CategoryServices => "categoryServices",
            Self::CategoryTranslations => "serviceCategoryTranslations",
            Self::CategoryTranslationEdges => "serviceCategoryTranslationsEdge",
            Self::ServiceTranslations => "serviceTranslations",
            Self::ServiceTranslationEdges => "serviceTranslationsEdge",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Singular label used in validation messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Categories => "ServiceCategory",
            Self::Services => "Service",
            Self::CategoryServices => "CategoryServices edge",
            Self::CategoryTranslations => "ServiceCategoryTranslation",
            Self::CategoryTranslationEdges => "ServiceCategoryTranslationsEdge",
            Self::ServiceTranslations => "ServiceTranslation",
            Self::ServiceTranslationEdges => "ServiceTranslationsEdge",
        }
    }

    pub fn kind(self) -> CollectionKind {
        if self.is_edge() {
            CollectionKind::Edge
        } else {
            CollectionKind::Document
        }
    }

    pub fn is_edge(self) -> bool {
        matches!(
            self,
            Self::CategoryServices | Self::CategoryTranslationEdges | Self::ServiceTranslationEdges
        )
    }

    /// Categories and services must exist for an export to run.
    pub fn is_mandatory_for_export(self) -> bool {
        matches!(self, Self::Categories | Self::Services)
    }

    /// For translation collections: the field holding the parent's key and
    /// the collection it points into.
    pub fn parent_reference(self) -> Option<(&'static str, Self)> {
        match self {
            Self::Services => Some(("categoryId", Self::Categories)),
            Self::CategoryTranslations => Some(("serviceCategoryId", Self::Categories)),
            Self::ServiceTranslations => Some(("serviceId", Self::Services)),
            _ => None,
        }
    }

    /// For edge collections: (`_from` collection, `_to` collection).
    pub fn edge_endpoints(self) -> Option<(Self, Self)> {
        match self {
            Self::CategoryServices => Some((Self::Categories, Self::Services)),
            Self::CategoryTranslationEdges => Some((Self::Categories, Self::CategoryTranslations)),
            Self::ServiceTranslationEdges => Some((Self::Services, Self::ServiceTranslations)),
            _ => None,
        }
    }
}

impl fmt::Display for HierarchyCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read a key-like field as a string. Numbers are accepted and rendered
/// without quotes; anything else is treated as absent.
pub fn field_str(record: &Record, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `serviceCategories/12` → `12`. Values without a slash are returned as is.
pub fn strip_collection_prefix(reference: &str) -> &str {
    reference
        .split_once('/')
        .map(|(_, key)| key)
        .unwrap_or(reference)
}

/// Identity used for skip-if-exists: `_key` for documents, `_from-_to` for edges.
pub fn natural_key(collection: HierarchyCollection, record: &Record) -> Option<String> {
    if collection.is_edge() {
        let from = field_str(record, "_from")?;
        let to = field_str(record, "_to")?;
        Some(format!("{from}-{to}"))
    } else {
        field_str(record, "_key")
    }
}

/// Records for every hierarchy collection, keyed in dependency order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchyDataset {
    records: BTreeMap<HierarchyCollection, Vec<Record>>,
}

impl HierarchyDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, collection: HierarchyCollection, records: Vec<Record>) -> Self {
        self.set(collection, records);
        self
    }

    pub fn set(&mut self, collection: HierarchyCollection, records: Vec<Record>) {
        self.records.insert(collection, records);
    }

    pub fn records(&self, collection: HierarchyCollection) -> &[Record] {
        self.records
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count(&self, collection: HierarchyCollection) -> usize {
        self.records(collection).len()
    }

    pub fn total(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// `(collection, count)` for all seven collections in dependency order.
    pub fn counts(&self) -> Vec<(HierarchyCollection, usize)> {
        HierarchyCollection::ALL
            .into_iter()
            .map(|c| (c, self.count(c)))
            .collect()
    }

    /// Distinct `_key` values of a collection.
    pub fn keys(&self, collection: HierarchyCollection) -> std::collections::HashSet<String> {
        self.records(collection)
            .iter()
            .filter_map(|r| field_str(r, "_key"))
            .collect()
    }
}
