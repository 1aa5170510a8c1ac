use arangomig_domain::{CollectionKind, Record};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::client::{array_field, ArangoClient};
use crate::infrastructure::ports::{CollectionInfo, SchemaStore, StoreError};

#[async_trait]
impl SchemaStore for ArangoClient {
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, StoreError> {
        let mut body = self
            .send("list collections", self.get("/_api/collection"))
            .await?;
        Ok(array_field(&mut body, "result")
            .iter()
            .filter_map(|entry| {
                Some(CollectionInfo {
                    name: entry.get("name")?.as_str()?.to_string(),
                    kind: CollectionKind::from_type_code(
                        entry.get("type").and_then(Value::as_u64).unwrap_or(2),
                    ),
                    is_system: entry
                        .get("isSystem")
                        .and_then(Value::as_bool)
                        .unwrap_or(false),
                })
            })
            .collect())
    }

    async fn collection_properties(&self, name: &str) -> Result<Value, StoreError> {
        self.send(
            "collection properties",
            self.get_at(&["_api", "collection", name, "properties"])?,
        )
        .await
    }

    async fn list_indexes(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let mut body = self
            .send(
                "list indexes",
                self.get("/_api/index").query(&[("collection", collection)]),
            )
            .await?;
        Ok(array_field(&mut body, "indexes"))
    }

    async fn stored_validation_rule(&self, collection: &str) -> Result<Option<Value>, StoreError> {
        let rows = self
            .query(
                "FOR c IN _collections FILTER c.name == @name RETURN c.schema",
                json!({ "name": collection }),
            )
            .await?;
        Ok(rows.into_iter().find(|rule| !rule.is_null()))
    }

    async fn sample_document(&self, collection: &str) -> Result<Option<Record>, StoreError> {
        let rows = self
            .query(
                "FOR d IN @@collection LIMIT 1 RETURN d",
                json!({ "@collection": collection }),
            )
            .await?;
        Ok(rows.into_iter().find_map(|row| match row {
            Value::Object(record) => Some(record),
            _ => None,
        }))
    }

    async fn list_graphs(&self) -> Result<Vec<Value>, StoreError> {
        let mut body = self.send("list graphs", self.get("/_api/gharial")).await?;
        Ok(array_field(&mut body, "graphs"))
    }

    async fn list_views(&self) -> Result<Vec<Value>, StoreError> {
        let mut body = self.send("list views", self.get("/_api/view")).await?;
        let mut views = Vec::new();
        for view in array_field(&mut body, "result") {
            let Some(name) = view.get("name").and_then(Value::as_str) else {
                continue;
            };
            let properties = self
                .send(
                    "view properties",
                    self.get_at(&["_api", "view", name, "properties"])?,
                )
                .await?;
            views.push(json!({
                "name": name,
                "type": view.get("type").cloned().unwrap_or(Value::Null),
                "properties": properties,
            }));
        }
        Ok(views)
    }

    async fn list_analyzers(&self) -> Result<Vec<Value>, StoreError> {
        let mut body = self.send("list analyzers", self.get("/_api/analyzer")).await?;
        Ok(array_field(&mut body, "result"))
    }

    async fn list_functions(&self) -> Result<Vec<Value>, StoreError> {
        let mut body = self
            .send("list functions", self.get("/_api/aqlfunction"))
            .await?;
        Ok(array_field(&mut body, "result"))
    }

    async fn define_collection(&self, options: &Value) -> Result<(), StoreError> {
        self.send("create collection", self.post("/_api/collection").json(options))
            .await
            .map(drop)
    }

    async fn define_index(&self, collection: &str, body: &Value) -> Result<(), StoreError> {
        self.send(
            "create index",
            self.post("/_api/index")
                .query(&[("collection", collection)])
                .json(body),
        )
        .await
        .map(drop)
    }

    async fn define_graph(&self, body: &Value) -> Result<(), StoreError> {
        self.send("create graph", self.post("/_api/gharial").json(body))
            .await
            .map(drop)
    }

    async fn define_view(&self, body: &Value) -> Result<(), StoreError> {
        self.send("create view", self.post("/_api/view").json(body))
            .await
            .map(drop)
    }

    async fn define_analyzer(&self, body: &Value) -> Result<(), StoreError> {
        self.send("create analyzer", self.post("/_api/analyzer").json(body))
            .await
            .map(drop)
    }

    async fn define_function(&self, body: &Value) -> Result<(), StoreError> {
        self.send("create function", self.post("/_api/aqlfunction").json(body))
            .await
            .map(drop)
    }
}
