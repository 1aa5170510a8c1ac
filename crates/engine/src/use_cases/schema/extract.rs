//! Read a live database into a portable schema document.

use std::sync::Arc;

use arangomig_domain::{
    AnalyzerSchema, CollectionProperties, CollectionSchema, FunctionSchema, GraphSchema,
    IndexSchema, SchemaDocument, ViewSchema,
};
use serde_json::Value;

use super::rule_recovery::{default_strategies, recover_rule, RuleRecoveryStrategy};
use super::SchemaError;
use crate::infrastructure::ports::{CollectionInfo, SchemaStore, StoreError};

/// Output path when none is given.
pub const DEFAULT_SCHEMA_FILE: &str = "./arango-schema.json";

/// Extracts collections, indexes, graphs, views, analyzers and functions.
///
/// Only the collection listing is fatal. A collection that cannot be fully
/// read is recorded with a minimal descriptor; the other entity kinds fall
/// back to an empty list.
pub struct ExtractSchema {
    store: Arc<dyn SchemaStore>,
    strategies: Vec<Box<dyn RuleRecoveryStrategy>>,
}

impl ExtractSchema {
    pub fn new(store: Arc<dyn SchemaStore>) -> Self {
        Self::with_strategies(store, default_strategies())
    }

    pub fn with_strategies(
        store: Arc<dyn SchemaStore>,
        strategies: Vec<Box<dyn RuleRecoveryStrategy>>,
    ) -> Self {
        Self { store, strategies }
    }

    pub async fn execute(&self, database: &str) -> Result<SchemaDocument, SchemaError> {
        tracing::info!(database, "Extracting schema");

        let mut schema = SchemaDocument::empty(database);

        let listing = self.store.list_collections().await?;
        for info in listing.iter().filter(|c| !c.is_system) {
            let collection = match self.extract_collection(info).await {
                Ok(collection) => collection,
                Err(e) => {
                    tracing::warn!(
                        collection = %info.name,
                        error = %e,
                        "Collection extraction failed, recording minimal descriptor"
                    );
                    self.minimal_collection(info).await
                }
            };
            tracing::info!(
                collection = %collection.name,
                kind = collection.kind.as_str(),
                indexes = collection.indexes.len(),
                validation = collection.properties.schema.is_some(),
                "Collection extracted"
            );
            schema.collections.push(collection);
        }

        schema.graphs = best_effort("graphs", self.store.list_graphs().await)
            .iter()
            .filter_map(GraphSchema::from_store)
            .collect();
        schema.views = best_effort("views", self.store.list_views().await)
            .iter()
            .filter_map(ViewSchema::from_store)
            .collect();
        schema.analyzers = best_effort("analyzers", self.store.list_analyzers().await)
            .iter()
            .filter_map(AnalyzerSchema::from_store)
            .collect();
        schema.functions = best_effort("functions", self.store.list_functions().await)
            .iter()
            .filter_map(FunctionSchema::from_store)
            .collect();

        let summary = schema.summary();
        tracing::info!(
            document_collections = summary.document_collections,
            edge_collections = summary.edge_collections,
            with_validation = summary.with_validation,
            indexes = summary.indexes,
            graphs = summary.graphs,
            views = summary.views,
            analyzers = summary.analyzers,
            functions = summary.functions,
            "Schema extraction complete"
        );

        Ok(schema)
    }

    async fn extract_collection(&self, info: &CollectionInfo) -> Result<CollectionSchema, StoreError> {
        let raw = self.store.collection_properties(&info.name).await?;
        let indexes = self.read_indexes(&info.name).await?;

        let mut properties = CollectionProperties::from_store(&raw);
        properties.schema =
            recover_rule(&self.strategies, self.store.as_ref(), &info.name, &raw).await;

        Ok(CollectionSchema {
            name: info.name.clone(),
            kind: info.kind,
            properties,
            indexes,
        })
    }

    async fn minimal_collection(&self, info: &CollectionInfo) -> CollectionSchema {
        let raw = self.store.collection_properties(&info.name).await.ok();
        let indexes = self.read_indexes(&info.name).await.unwrap_or_default();
        CollectionSchema::minimal(info.name.clone(), info.kind, raw.as_ref(), indexes)
    }

    async fn read_indexes(&self, collection: &str) -> Result<Vec<IndexSchema>, StoreError> {
        Ok(self
            .store
            .list_indexes(collection)
            .await?
            .iter()
            .filter_map(IndexSchema::from_store)
            .collect())
    }
}

fn best_effort(kind: &'static str, result: Result<Vec<Value>, StoreError>) -> Vec<Value> {
    result.unwrap_or_else(|e| {
        tracing::warn!(kind, error = %e, "Could not list entities, continuing without them");
        Vec::new()
    })
}
