//! In-memory implementation of both store ports.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use arangomig_domain::{field_str, CollectionKind, HierarchyCollection, Record};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{
    error_num, CollectionInfo, DocumentStore, SchemaStore, StoreError,
};

#[derive(Debug, Clone)]
struct StoredCollection {
    kind: CollectionKind,
    properties: Value,
    indexes: Vec<Value>,
    documents: Vec<Record>,
}

impl StoredCollection {
    fn new(kind: CollectionKind, properties: Value) -> Self {
        let mut indexes = vec![json!({"type": "primary", "fields": ["_key"], "unique": true, "name": "primary"})];
        if kind == CollectionKind::Edge {
            indexes.push(json!({"type": "edge", "fields": ["_from", "_to"], "name": "edge"}));
        }
        Self {
            kind,
            properties,
            indexes,
            documents: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    databases: HashSet<String>,
    collections: BTreeMap<String, StoredCollection>,
    graphs: BTreeMap<String, Value>,
    views: BTreeMap<String, Value>,
    analyzers: BTreeMap<String, Value>,
    functions: BTreeMap<String, Value>,
    failing_inserts: HashSet<(String, String)>,
    next_key: u64,
}

/// One database held in memory behind a tokio `RwLock`.
pub struct InMemoryStore {
    database: String,
    state: RwLock<State>,
    inserts: AtomicUsize,
}

impl InMemoryStore {
    /// A store whose `database` already exists and holds no collections.
    pub fn new(database: &str) -> Self {
        let mut store = Self::without_database(database);
        store.state.get_mut().databases.insert(database.to_string());
        store
    }

    /// A store with no databases at all.
    pub fn without_database(database: &str) -> Self {
        let state = State {
            next_key: 1000,
            ..State::default()
        };
        Self {
            database: database.to_string(),
            state: RwLock::new(state),
            inserts: AtomicUsize::new(0),
        }
    }

    pub fn with_collection(mut self, name: &str, kind: CollectionKind) -> Self {
        self.state
            .get_mut()
            .collections
            .entry(name.to_string())
            .or_insert_with(|| StoredCollection::new(kind, json!({"waitForSync": false})));
        self
    }

    /// All seven hierarchy collections, empty.
    pub fn with_hierarchy_collections(self) -> Self {
        HierarchyCollection::ALL
            .into_iter()
            .fold(self, |store, c| store.with_collection(c.name(), c.kind()))
    }

    /// Put records straight into a collection, bypassing insert accounting.
    pub async fn seed(&self, collection: &str, records: Vec<Record>) {
        let mut state = self.state.write().await;
        let stored = state
            .collections
            .entry(collection.to_string())
            .or_insert_with(|| StoredCollection::new(CollectionKind::Document, json!({})));
        stored.documents.extend(records);
    }

    pub async fn documents(&self, collection: &str) -> Vec<Record> {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }

    pub async fn indexes(&self, collection: &str) -> Vec<Value> {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .map(|c| c.indexes.clone())
            .unwrap_or_default()
    }

    pub async fn has_database(&self, name: &str) -> bool {
        self.state.read().await.databases.contains(name)
    }

    /// Make inserts of `key` into `collection` fail with a server error.
    pub async fn fail_insert_for(&self, collection: &str, key: &str) {
        self.state
            .write()
            .await
            .failing_inserts
            .insert((collection.to_string(), key.to_string()));
    }

    /// Successful `insert` calls so far.
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    fn missing_collection(name: &str) -> StoreError {
        StoreError::api(
            "collection",
            404,
            Some(error_num::COLLECTION_NOT_FOUND),
            format!("collection or view not found: {name}"),
        )
    }
}

fn name_of(body: &Value) -> Result<String, StoreError> {
    body.get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::api("create", 400, None, "name is missing"))
}

fn matches_filter(record: &Record, filter: &Record) -> bool {
    filter.iter().all(|(field, value)| record.get(field) == Some(value))
}

// =============================================================================
// Schema Store
// =============================================================================

#[async_trait]
impl SchemaStore for InMemoryStore {
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .iter()
            .map(|(name, c)| CollectionInfo {
                name: name.clone(),
                kind: c.kind,
                is_system: name.starts_with('_'),
            })
            .collect())
    }

    async fn collection_properties(&self, name: &str) -> Result<Value, StoreError> {
        let state = self.state.read().await;
        state
            .collections
            .get(name)
            .map(|c| c.properties.clone())
            .ok_or_else(|| Self::missing_collection(name))
    }

    async fn list_indexes(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let state = self.state.read().await;
        state
            .collections
            .get(collection)
            .map(|c| c.indexes.clone())
            .ok_or_else(|| Self::missing_collection(collection))
    }

    async fn stored_validation_rule(&self, collection: &str) -> Result<Option<Value>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .and_then(|c| c.properties.get("schema"))
            .filter(|rule| !rule.is_null())
            .cloned())
    }

    async fn sample_document(&self, collection: &str) -> Result<Option<Record>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .and_then(|c| c.documents.first().cloned()))
    }

    async fn list_graphs(&self) -> Result<Vec<Value>, StoreError> {
        Ok(self.state.read().await.graphs.values().cloned().collect())
    }

    async fn list_views(&self) -> Result<Vec<Value>, StoreError> {
        Ok(self.state.read().await.views.values().cloned().collect())
    }

    async fn list_analyzers(&self) -> Result<Vec<Value>, StoreError> {
        Ok(self.state.read().await.analyzers.values().cloned().collect())
    }

    async fn list_functions(&self) -> Result<Vec<Value>, StoreError> {
        Ok(self.state.read().await.functions.values().cloned().collect())
    }

    async fn define_collection(&self, options: &Value) -> Result<(), StoreError> {
        let name = name_of(options)?;
        let kind = CollectionKind::from_type_code(
            options.get("type").and_then(Value::as_u64).unwrap_or(2),
        );
        let mut state = self.state.write().await;
        if state.collections.contains_key(&name) {
            return Err(StoreError::api(
                "create collection",
                409,
                Some(error_num::DUPLICATE_NAME),
                "duplicate name",
            ));
        }
        let mut properties = options.clone();
        if let Value::Object(fields) = &mut properties {
            fields.remove("name");
            fields.remove("type");
        }
        state
            .collections
            .insert(name, StoredCollection::new(kind, properties));
        Ok(())
    }

    async fn define_index(&self, collection: &str, body: &Value) -> Result<(), StoreError> {
        self.ensure_index(collection, body).await
    }

    async fn define_graph(&self, body: &Value) -> Result<(), StoreError> {
        let name = name_of(body)?;
        let mut state = self.state.write().await;
        if state.graphs.contains_key(&name) {
            return Err(StoreError::api(
                "create graph",
                409,
                Some(error_num::GRAPH_DUPLICATE),
                "graph already exists",
            ));
        }
        state.graphs.insert(name, body.clone());
        Ok(())
    }

    async fn define_view(&self, body: &Value) -> Result<(), StoreError> {
        let name = name_of(body)?;
        let mut state = self.state.write().await;
        if state.views.contains_key(&name) {
            return Err(StoreError::api(
                "create view",
                409,
                Some(error_num::DUPLICATE_NAME),
                "duplicate name",
            ));
        }
        let mut properties = body.clone();
        if let Value::Object(fields) = &mut properties {
            fields.remove("name");
            fields.remove("type");
        }
        let entry = json!({
            "name": name,
            "type": body.get("type").cloned().unwrap_or(Value::Null),
            "properties": properties,
        });
        state.views.insert(name, entry);
        Ok(())
    }

    async fn define_analyzer(&self, body: &Value) -> Result<(), StoreError> {
        let scoped = format!("{}::{}", self.database, name_of(body)?);
        let mut state = self.state.write().await;
        if state.analyzers.contains_key(&scoped) {
            return Err(StoreError::api(
                "create analyzer",
                409,
                Some(error_num::ANALYZER_DUPLICATE),
                "analyzer with different definition exists",
            ));
        }
        let mut entry = body.clone();
        entry["name"] = json!(scoped);
        state.analyzers.insert(scoped, entry);
        Ok(())
    }

    async fn define_function(&self, body: &Value) -> Result<(), StoreError> {
        let name = name_of(body)?;
        self.state.write().await.functions.insert(name, body.clone());
        Ok(())
    }
}

// =============================================================================
// Document Store
// =============================================================================

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn database_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.state.read().await.databases.contains(name))
    }

    async fn create_database(&self, name: &str) -> Result<(), StoreError> {
        self.state.write().await.databases.insert(name.to_string());
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.state.read().await.collections.contains_key(name))
    }

    async fn create_collection(&self, name: &str, kind: CollectionKind) -> Result<(), StoreError> {
        self.define_collection(&json!({"name": name, "type": kind.type_code()}))
            .await
    }

    async fn ensure_index(&self, collection: &str, index: &Value) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let stored = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::missing_collection(collection))?;
        let same_fields = |existing: &Value| {
            existing.get("fields") == index.get("fields")
                && existing.get("type") == index.get("type")
        };
        if !stored.indexes.iter().any(same_fields) {
            stored.indexes.push(index.clone());
        }
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let state = self.state.read().await;
        state
            .collections
            .get(collection)
            .map(|c| c.documents.len() as u64)
            .ok_or_else(|| Self::missing_collection(collection))
    }

    async fn all_documents(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let state = self.state.read().await;
        state
            .collections
            .get(collection)
            .map(|c| c.documents.clone())
            .ok_or_else(|| Self::missing_collection(collection))
    }

    async fn document(&self, collection: &str, key: &str) -> Result<Option<Record>, StoreError> {
        let state = self.state.read().await;
        let stored = state
            .collections
            .get(collection)
            .ok_or_else(|| Self::missing_collection(collection))?;
        Ok(stored
            .documents
            .iter()
            .find(|d| field_str(d, "_key").as_deref() == Some(key))
            .cloned())
    }

    async fn find_first(
        &self,
        collection: &str,
        filter: &Record,
    ) -> Result<Option<Record>, StoreError> {
        let state = self.state.read().await;
        let stored = state
            .collections
            .get(collection)
            .ok_or_else(|| Self::missing_collection(collection))?;
        Ok(stored
            .documents
            .iter()
            .find(|d| matches_filter(d, filter))
            .cloned())
    }

    async fn insert(&self, collection: &str, record: &Record) -> Result<String, StoreError> {
        let mut state = self.state.write().await;
        let key = match field_str(record, "_key") {
            Some(key) => key,
            None => {
                state.next_key += 1;
                state.next_key.to_string()
            }
        };
        if state
            .failing_inserts
            .contains(&(collection.to_string(), key.clone()))
        {
            return Err(StoreError::api("insert document", 500, None, "injected failure"));
        }

        let stored = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::missing_collection(collection))?;
        if stored
            .documents
            .iter()
            .any(|d| field_str(d, "_key").as_deref() == Some(key.as_str()))
        {
            return Err(StoreError::api(
                "insert document",
                409,
                Some(error_num::UNIQUE_CONSTRAINT_VIOLATED),
                "unique constraint violated",
            ));
        }

        let mut document = record.clone();
        document.insert("_key".into(), json!(key));
        document.insert("_id".into(), json!(format!("{collection}/{key}")));
        stored.documents.push(document);
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(key)
    }

    async fn hierarchy_sample(&self, limit: usize) -> Result<Vec<Value>, StoreError> {
        let state = self.state.read().await;
        let docs = |c: HierarchyCollection| {
            state
                .collections
                .get(c.name())
                .map(|s| s.documents.clone())
                .unwrap_or_default()
        };
        let targets = |edges: &[Record], from: &str| -> Vec<String> {
            edges
                .iter()
                .filter(|e| field_str(e, "_from").as_deref() == Some(from))
                .filter_map(|e| field_str(e, "_to"))
                .collect()
        };

        let mut categories = docs(HierarchyCollection::Categories);
        categories.sort_by_key(|c| c.get("order").and_then(Value::as_i64).unwrap_or(i64::MAX));
        let category_edges = docs(HierarchyCollection::CategoryServices);
        let translation_edges = docs(HierarchyCollection::CategoryTranslationEdges);

        Ok(categories
            .into_iter()
            .take(limit)
            .map(|category| {
                let id = format!(
                    "{}/{}",
                    HierarchyCollection::Categories,
                    field_str(&category, "_key").unwrap_or_default()
                );
                json!({
                    "nameEN": category.get("nameEN").cloned().unwrap_or(Value::Null),
                    "services": targets(&category_edges, &id),
                    "translations": targets(&translation_edges, &id),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::record;

    #[tokio::test]
    async fn insert_assigns_id_and_rejects_duplicate_keys() {
        let store = InMemoryStore::new("db").with_collection("services", CollectionKind::Document);
        let key = store
            .insert("services", &record(json!({"_key": "101"})))
            .await
            .unwrap();
        assert_eq!(key, "101");
        assert_eq!(store.documents("services").await[0]["_id"], "services/101");

        let err = store
            .insert("services", &record(json!({"_key": "101"})))
            .await
            .unwrap_err();
        assert!(err.is_conflict(&[error_num::UNIQUE_CONSTRAINT_VIOLATED]));
        assert_eq!(store.insert_count(), 1);
    }

    #[tokio::test]
    async fn analyzers_are_listed_with_database_scope() {
        let store = InMemoryStore::new("db");
        store
            .define_analyzer(&json!({"name": "text_nl", "type": "text"}))
            .await
            .unwrap();
        let listed = store.list_analyzers().await.unwrap();
        assert_eq!(listed[0]["name"], "db::text_nl");
        assert!(store
            .define_analyzer(&json!({"name": "text_nl"}))
            .await
            .unwrap_err()
            .is_conflict(&[error_num::ANALYZER_DUPLICATE]));
    }
}
