//! Validation-rule recovery.
//!
//! Depending on server version and permissions a collection's rule shows up
//! in different places. Strategies are tried in order; the first non-null
//! rule wins. A failing strategy is logged and skipped.

use async_trait::async_trait;
use serde_json::Value;

use crate::infrastructure::ports::{SchemaStore, StoreError};

#[async_trait]
pub trait RuleRecoveryStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `properties` is the collection's properties response.
    async fn recover(
        &self,
        store: &dyn SchemaStore,
        collection: &str,
        properties: &Value,
    ) -> Result<Option<Value>, StoreError>;
}

/// Registry, attribute peek, then the properties `schema` field.
pub fn default_strategies() -> Vec<Box<dyn RuleRecoveryStrategy>> {
    vec![
        Box::new(RegistryQuery),
        Box::new(AttributePeek),
        Box::new(PropertiesField),
    ]
}

/// Look the rule up in the `_collections` system registry.
pub struct RegistryQuery;

#[async_trait]
impl RuleRecoveryStrategy for RegistryQuery {
    fn name(&self) -> &'static str {
        "registry query"
    }

    async fn recover(
        &self,
        store: &dyn SchemaStore,
        collection: &str,
        _properties: &Value,
    ) -> Result<Option<Value>, StoreError> {
        store.stored_validation_rule(collection).await
    }
}

/// Log the attribute names of one document. Never yields a rule.
pub struct AttributePeek;

#[async_trait]
impl RuleRecoveryStrategy for AttributePeek {
    fn name(&self) -> &'static str {
        "attribute peek"
    }

    async fn recover(
        &self,
        store: &dyn SchemaStore,
        collection: &str,
        _properties: &Value,
    ) -> Result<Option<Value>, StoreError> {
        if let Some(document) = store.sample_document(collection).await? {
            let attributes: Vec<&str> = document.keys().map(String::as_str).collect();
            tracing::debug!(collection, attributes = ?attributes, "Sample document attributes");
        }
        Ok(None)
    }
}

/// Read `schema` from the collection properties.
pub struct PropertiesField;

#[async_trait]
impl RuleRecoveryStrategy for PropertiesField {
    fn name(&self) -> &'static str {
        "properties field"
    }

    async fn recover(
        &self,
        _store: &dyn SchemaStore,
        _collection: &str,
        properties: &Value,
    ) -> Result<Option<Value>, StoreError> {
        Ok(properties.get("schema").filter(|s| !s.is_null()).cloned())
    }
}

/// Run `strategies` in order and return the first rule found.
pub(super) async fn recover_rule(
    strategies: &[Box<dyn RuleRecoveryStrategy>],
    store: &dyn SchemaStore,
    collection: &str,
    properties: &Value,
) -> Option<Value> {
    for strategy in strategies {
        match strategy.recover(store, collection, properties).await {
            Ok(Some(rule)) => {
                tracing::debug!(collection, strategy = strategy.name(), "Validation rule recovered");
                return Some(rule);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    collection,
                    strategy = strategy.name(),
                    error = %e,
                    "Validation rule lookup failed"
                );
            }
        }
    }
    None
}
