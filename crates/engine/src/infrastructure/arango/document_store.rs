use arangomig_domain::{CollectionKind, HierarchyCollection, Record};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::client::{array_field, ArangoClient};
use crate::infrastructure::ports::{DocumentStore, StoreError};

#[async_trait]
impl DocumentStore for ArangoClient {
    async fn database_exists(&self, name: &str) -> Result<bool, StoreError> {
        let mut body = self
            .send("list databases", self.system_get("/_api/database"))
            .await?;
        Ok(array_field(&mut body, "result")
            .iter()
            .any(|db| db.as_str() == Some(name)))
    }

    async fn create_database(&self, name: &str) -> Result<(), StoreError> {
        self.send(
            "create database",
            self.system_post("/_api/database").json(&json!({ "name": name })),
        )
        .await
        .map(drop)
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, StoreError> {
        match self
            .send("get collection", self.get_at(&["_api", "collection", name])?)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_collection(&self, name: &str, kind: CollectionKind) -> Result<(), StoreError> {
        self.send(
            "create collection",
            self.post("/_api/collection")
                .json(&json!({ "name": name, "type": kind.type_code() })),
        )
        .await
        .map(drop)
    }

    async fn ensure_index(&self, collection: &str, index: &Value) -> Result<(), StoreError> {
        // POST /_api/index returns the existing index when an identical one is present.
        self.send(
            "ensure index",
            self.post("/_api/index")
                .query(&[("collection", collection)])
                .json(index),
        )
        .await
        .map(drop)
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let body = self
            .send(
                "count documents",
                self.get_at(&["_api", "collection", collection, "count"])?,
            )
            .await?;
        body.get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| StoreError::serialization("count response has no `count`"))
    }

    async fn all_documents(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let rows = self
            .query(
                "FOR d IN @@collection RETURN d",
                json!({ "@collection": collection }),
            )
            .await?;
        Ok(into_records(rows))
    }

    async fn document(&self, collection: &str, key: &str) -> Result<Option<Record>, StoreError> {
        match self
            .send(
                "read document",
                self.get_at(&["_api", "document", collection, key])?,
            )
            .await
        {
            Ok(Value::Object(record)) => Ok(Some(record)),
            Ok(_) => Err(StoreError::serialization("document response is not an object")),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_first(
        &self,
        collection: &str,
        filter: &Record,
    ) -> Result<Option<Record>, StoreError> {
        let mut bind_vars = Map::new();
        bind_vars.insert("@collection".into(), json!(collection));
        let mut conditions = Vec::with_capacity(filter.len());
        for (i, (field, value)) in filter.iter().enumerate() {
            conditions.push(format!("d[@f{i}] == @v{i}"));
            bind_vars.insert(format!("f{i}"), json!(field));
            bind_vars.insert(format!("v{i}"), value.clone());
        }
        let filter_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("FILTER {}", conditions.join(" AND "))
        };

        let rows = self
            .query(
                &format!("FOR d IN @@collection {filter_clause} LIMIT 1 RETURN d"),
                Value::Object(bind_vars),
            )
            .await?;
        Ok(into_records(rows).into_iter().next())
    }

    async fn insert(&self, collection: &str, record: &Record) -> Result<String, StoreError> {
        let body = self
            .send(
                "save document",
                self.post_at(&["_api", "document", collection])?
                    .query(&[("waitForSync", "true")])
                    .json(record),
            )
            .await?;
        Ok(body
            .get("_key")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    async fn hierarchy_sample(&self, limit: usize) -> Result<Vec<Value>, StoreError> {
        self.query(
            "FOR c IN @@categories SORT c.order LIMIT @limit \
               LET services = (FOR s IN 1..1 OUTBOUND c @@categoryServices \
                 RETURN { key: s._key, nameEN: s.nameEN }) \
               LET translations = (FOR t IN 1..1 OUTBOUND c @@categoryTranslationEdges \
                 RETURN { languageCode: t.languageCode, translation: t.translation }) \
               RETURN { key: c._key, nameEN: c.nameEN, services, translations }",
            json!({
                "@categories": HierarchyCollection::Categories.name(),
                "@categoryServices": HierarchyCollection::CategoryServices.name(),
                "@categoryTranslationEdges": HierarchyCollection::CategoryTranslationEdges.name(),
                "limit": limit,
            }),
        )
        .await
    }
}

fn into_records(rows: Vec<Value>) -> Vec<Record> {
    rows.into_iter()
        .filter_map(|row| match row {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect()
}
