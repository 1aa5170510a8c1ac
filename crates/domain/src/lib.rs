//! Arangomig domain layer.
//!
//! Pure types and rules shared by every migration tool. Nothing in this crate
//! talks to the store, the filesystem or the network.
//!
//! ## Structure
//!
//! - `schema/` - portable schema document (collections, indexes, graphs,
//!   views, analyzers, functions) and validation-rule cleaning
//! - `hierarchy/` - the seven category/service/translation collections, the
//!   projection table, import format decoding, validation and the export
//!   document
//! - `seed/` - plans for building the hierarchy from scratch

pub mod error;
pub mod hierarchy;
pub mod schema;
pub mod seed;

pub use error::DomainError;

pub use schema::{
    normalize_analyzer_name, strip_annotations, AnalyzerSchema, ClusterProperties,
    CollectionKind, CollectionProperties, CollectionSchema, FunctionSchema, GraphOptions,
    GraphSchema, IndexSchema, SchemaDocument, SchemaSummary, ValidationSettings, ViewSchema,
};

pub use hierarchy::{
    compare_values, field_str, natural_key, projection_for, strip_collection_prefix,
    validate_dataset, validate_export_value, CollectionProjection, ExportCheck, ExportDocument,
    ExportMetadata, FieldSpec, HierarchyCollection, HierarchyDataset, ImportFormat, Record,
    ValidationReport, CURRENT_EXPORT_VERSION, MAX_REPORTED_ISSUES,
};

pub use seed::{
    fallback_translation, translation_key, CategorySpec, HierarchySpec, LanguageCode,
    SequenceStart,
};
