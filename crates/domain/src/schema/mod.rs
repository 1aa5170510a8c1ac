//! Portable schema document.

mod document;
mod rule;

pub use document::{
    normalize_analyzer_name, AnalyzerSchema, ClusterProperties, CollectionKind,
    CollectionProperties, CollectionSchema, FunctionSchema, GraphOptions, GraphSchema,
    IndexSchema, SchemaDocument, SchemaSummary, ViewSchema,
};
pub use rule::{strip_annotations, ValidationSettings, DEFAULT_RULE_LEVEL, DEFAULT_RULE_MESSAGE};
