//! Store ports: schema introspection/creation and document access.

use arangomig_domain::{CollectionKind, Record};
use async_trait::async_trait;
use serde_json::Value;

use super::StoreError;

/// Entry of the collection listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub name: String,
    pub kind: CollectionKind,
    pub is_system: bool,
}

// =============================================================================
// Schema Store
// =============================================================================

/// Reads and defines database-level schema entities.
///
/// Listing calls return the store's raw JSON; the domain's `from_store`
/// constructors turn it into schema types. `define_*` calls take a ready
/// request body and report "already exists" as a conflict [`StoreError`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaStore: Send + Sync {
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, StoreError>;
    async fn collection_properties(&self, name: &str) -> Result<Value, StoreError>;
    async fn list_indexes(&self, collection: &str) -> Result<Vec<Value>, StoreError>;
    /// The `schema` entry recorded for a collection in the `_collections` registry.
    async fn stored_validation_rule(&self, collection: &str) -> Result<Option<Value>, StoreError>;
    /// Any one document of the collection.
    async fn sample_document(&self, collection: &str) -> Result<Option<Record>, StoreError>;
    async fn list_graphs(&self) -> Result<Vec<Value>, StoreError>;
    /// Views with their properties merged in.
    async fn list_views(&self) -> Result<Vec<Value>, StoreError>;
    async fn list_analyzers(&self) -> Result<Vec<Value>, StoreError>;
    async fn list_functions(&self) -> Result<Vec<Value>, StoreError>;

    async fn define_collection(&self, options: &Value) -> Result<(), StoreError>;
    async fn define_index(&self, collection: &str, body: &Value) -> Result<(), StoreError>;
    async fn define_graph(&self, body: &Value) -> Result<(), StoreError>;
    async fn define_view(&self, body: &Value) -> Result<(), StoreError>;
    async fn define_analyzer(&self, body: &Value) -> Result<(), StoreError>;
    async fn define_function(&self, body: &Value) -> Result<(), StoreError>;
}

// =============================================================================
// Document Store
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn database_exists(&self, name: &str) -> Result<bool, StoreError>;
    async fn create_database(&self, name: &str) -> Result<(), StoreError>;

    async fn collection_exists(&self, name: &str) -> Result<bool, StoreError>;
    async fn create_collection(&self, name: &str, kind: CollectionKind) -> Result<(), StoreError>;
    /// Create an index unless an equivalent one is already present.
    async fn ensure_index(&self, collection: &str, index: &Value) -> Result<(), StoreError>;

    async fn count(&self, collection: &str) -> Result<u64, StoreError>;
    async fn all_documents(&self, collection: &str) -> Result<Vec<Record>, StoreError>;
    async fn document(&self, collection: &str, key: &str) -> Result<Option<Record>, StoreError>;
    /// First document whose fields equal every entry of `filter`.
    async fn find_first(&self, collection: &str, filter: &Record)
        -> Result<Option<Record>, StoreError>;
    /// Insert and wait for sync. Returns the stored `_key`.
    async fn insert(&self, collection: &str, record: &Record) -> Result<String, StoreError>;

    /// The first `limit` categories (by order) with their services and
    /// translations resolved through the edge collections.
    async fn hierarchy_sample(&self, limit: usize) -> Result<Vec<Value>, StoreError>;
}
