//! Apply a schema document to a target database.

use std::fmt;
use std::sync::Arc;

use arangomig_domain::{CollectionSchema, SchemaDocument, ValidationSettings};

use crate::infrastructure::ports::{error_num, RunLog, SchemaStore, StoreError};

/// Where the run log is written after a creation run.
pub const SCHEMA_LOG_FILE: &str = "./schema-creation-complete-log.txt";

/// Outcome counters for one entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityTally {
    pub created: usize,
    pub existing: usize,
    pub failed: usize,
}

impl fmt::Display for EntityTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} existing, {} failed",
            self.created, self.existing, self.failed
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaCreationReport {
    pub collections: EntityTally,
    pub indexes: EntityTally,
    pub graphs: EntityTally,
    pub views: EntityTally,
    pub analyzers: EntityTally,
    pub functions: EntityTally,
}

impl SchemaCreationReport {
    pub fn failures(&self) -> usize {
        self.tallies().iter().map(|(_, t)| t.failed).sum()
    }

    pub fn tallies(&self) -> [(&'static str, EntityTally); 6] {
        [
            ("collections", self.collections),
            ("indexes", self.indexes),
            ("graphs", self.graphs),
            ("views", self.views),
            ("analyzers", self.analyzers),
            ("functions", self.functions),
        ]
    }
}

/// Creates collections, indexes, graphs, views, analyzers and functions in
/// that order. "Already exists" counts as success; any other failure is
/// logged and the run moves on to the next entity.
pub struct CreateSchema {
    store: Arc<dyn SchemaStore>,
    log: Arc<dyn RunLog>,
}

impl CreateSchema {
    pub fn new(store: Arc<dyn SchemaStore>, log: Arc<dyn RunLog>) -> Self {
        Self { store, log }
    }

    pub async fn execute(&self, schema: &SchemaDocument) -> SchemaCreationReport {
        let mut report = SchemaCreationReport::default();
        self.log.info(&format!(
            "Creating schema from database '{}' ({} collections)",
            schema.database,
            schema.collections.len()
        ));

        for collection in &schema.collections {
            self.create_collection(collection, &mut report.collections)
                .await;
        }

        for collection in &schema.collections {
            for index in collection.indexes.iter().filter(|i| !i.is_auto_managed()) {
                let label = format!(
                    "index {} on {}",
                    index.name.as_deref().unwrap_or(&index.fields.join(",")),
                    collection.name
                );
                let result = self
                    .store
                    .define_index(&collection.name, &index.creation_body())
                    .await;
                self.tally(&mut report.indexes, &label, result, &[]);
            }
        }

        for graph in &schema.graphs {
            let result = self.store.define_graph(&graph.creation_body()).await;
            self.tally(
                &mut report.graphs,
                &format!("graph {}", graph.name),
                result,
                &[error_num::GRAPH_DUPLICATE],
            );
        }

        for view in &schema.views {
            let result = self.store.define_view(&view.creation_body()).await;
            self.tally(
                &mut report.views,
                &format!("view {}", view.name),
                result,
                &[error_num::DUPLICATE_NAME],
            );
        }

        for analyzer in &schema.analyzers {
            let result = self.store.define_analyzer(&analyzer.creation_body()).await;
            self.tally(
                &mut report.analyzers,
                &format!("analyzer {}", analyzer.name),
                result,
                &[error_num::ANALYZER_DUPLICATE],
            );
        }

        for function in &schema.functions {
            let result = self.store.define_function(&function.creation_body()).await;
            self.tally(
                &mut report.functions,
                &format!("function {}", function.name),
                result,
                &[error_num::FUNCTION_DUPLICATE],
            );
        }

        for (kind, tally) in report.tallies() {
            self.log.info(&format!("{kind}: {tally}"));
        }
        report
    }

    async fn create_collection(&self, collection: &CollectionSchema, tally: &mut EntityTally) {
        let validation = match &collection.properties.schema {
            None => None,
            Some(stored) => match ValidationSettings::from_stored(stored) {
                Ok(settings) => Some(settings.to_value()),
                Err(e) => {
                    self.log.warn(&format!(
                        "collection {}: validation rule ignored ({e})",
                        collection.name
                    ));
                    None
                }
            },
        };
        let with_validation = validation.is_some();

        let result = self
            .store
            .define_collection(&collection.creation_options(validation))
            .await;
        let label = if with_validation {
            format!("{} collection {} (with validation)", collection.kind.as_str(), collection.name)
        } else {
            format!("{} collection {}", collection.kind.as_str(), collection.name)
        };
        self.tally(tally, &label, result, &[error_num::DUPLICATE_NAME]);
    }

    fn tally(
        &self,
        tally: &mut EntityTally,
        label: &str,
        result: Result<(), StoreError>,
        conflict_codes: &[u64],
    ) {
        match result {
            Ok(()) => {
                tally.created += 1;
                self.log.info(&format!("Created {label}"));
            }
            Err(e) if e.is_conflict(conflict_codes) => {
                tally.existing += 1;
                self.log.info(&format!("Skipped {label}: already exists"));
            }
            Err(e) => {
                tally.failed += 1;
                self.log.error(&format!("Failed to create {label}: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockRunLog, MockSchemaStore};
    use arangomig_domain::{
        CollectionKind, CollectionProperties, FunctionSchema, GraphSchema, IndexSchema, ViewSchema,
    };
    use serde_json::{json, Value};

    fn quiet_log() -> Arc<MockRunLog> {
        let mut log = MockRunLog::new();
        log.expect_info().returning(|_| ());
        log.expect_warn().returning(|_| ());
        log.expect_error().returning(|_| ());
        Arc::new(log)
    }

    fn collection(name: &str, schema: Option<Value>, indexes: Vec<Value>) -> CollectionSchema {
        CollectionSchema {
            name: name.into(),
            kind: CollectionKind::Document,
            properties: CollectionProperties {
                schema,
                ..Default::default()
            },
            indexes: indexes.iter().filter_map(IndexSchema::from_store).collect(),
        }
    }

    #[tokio::test]
    async fn attaches_cleaned_rule_with_defaults() {
        let mut store = MockSchemaStore::new();
        store
            .expect_define_collection()
            .withf(|options: &Value| {
                options["schema"]["level"] == "none"
                    && options["schema"]["message"] == "Document does not match schema"
                    && options["schema"]["rule"]["properties"]["name"] == json!({"type": "string"})
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut schema = SchemaDocument::empty("src");
        schema.collections.push(collection(
            "services",
            Some(json!({"type": "object", "properties": {"name": {"type": "string", "optional": true}}})),
            vec![],
        ));

        let report = CreateSchema::new(Arc::new(store), quiet_log())
            .execute(&schema)
            .await;
        assert_eq!(report.collections.created, 1);
    }

    #[tokio::test]
    async fn invalid_rule_creates_collection_without_validation() {
        let mut store = MockSchemaStore::new();
        store
            .expect_define_collection()
            .withf(|options: &Value| options.get("schema").is_none())
            .returning(|_| Ok(()));

        let mut log = MockRunLog::new();
        log.expect_info().returning(|_| ());
        log.expect_warn()
            .withf(|m: &str| m.contains("validation rule ignored"))
            .times(1)
            .returning(|_| ());

        let mut schema = SchemaDocument::empty("src");
        schema
            .collections
            .push(collection("broken", Some(json!("not an object")), vec![]));

        let report = CreateSchema::new(Arc::new(store), Arc::new(log))
            .execute(&schema)
            .await;
        assert_eq!(report.collections.created, 1);
    }

    #[tokio::test]
    async fn existing_entities_are_not_failures() {
        let mut store = MockSchemaStore::new();
        store
            .expect_define_collection()
            .returning(|_| Err(StoreError::api("create collection", 409, Some(1207), "duplicate")));
        store
            .expect_define_index()
            .returning(|_, _| Ok(()));
        store
            .expect_define_graph()
            .returning(|_| Err(StoreError::api("create graph", 400, Some(1925), "graph exists")));
        store
            .expect_define_view()
            .returning(|_| Err(StoreError::api("create view", 409, Some(1207), "duplicate")));
        store
            .expect_define_function()
            .returning(|_| Err(StoreError::api("create function", 400, Some(1581), "invalid code")));

        let mut schema = SchemaDocument::empty("src");
        schema.collections.push(collection(
            "services",
            None,
            vec![
                json!({"type": "primary", "fields": ["_key"]}),
                json!({"type": "edge", "fields": ["_from", "_to"]}),
                json!({"type": "persistent", "fields": ["categoryId"], "name": "idx"}),
            ],
        ));
        schema.graphs.push(GraphSchema::from_store(&json!({"name": "hierarchy"})).unwrap());
        schema.views.push(ViewSchema::from_store(&json!({"name": "search"})).unwrap());
        schema
            .functions
            .push(FunctionSchema::from_store(&json!({"name": "F::X", "code": "x"})).unwrap());

        let report = CreateSchema::new(Arc::new(store), quiet_log())
            .execute(&schema)
            .await;

        assert_eq!(report.collections.existing, 1);
        assert_eq!(report.indexes.created, 1);
        assert_eq!(report.graphs.existing, 1);
        assert_eq!(report.views.existing, 1);
        assert_eq!(report.functions.failed, 1);
        assert_eq!(report.failures(), 1);
    }

    #[tokio::test]
    async fn unique_index_rejected_by_existing_data_is_a_failure() {
        let mut store = MockSchemaStore::new();
        store.expect_define_collection().returning(|_| Ok(()));
        store.expect_define_index().returning(|_, _| {
            Err(StoreError::api(
                "create index",
                409,
                Some(error_num::UNIQUE_CONSTRAINT_VIOLATED),
                "unique constraint violated",
            ))
        });

        let mut schema = SchemaDocument::empty("src");
        schema.collections.push(collection(
            "services",
            None,
            vec![json!({"type": "persistent", "fields": ["nameEN"], "unique": true, "name": "idx_name"})],
        ));

        let report = CreateSchema::new(Arc::new(store), quiet_log())
            .execute(&schema)
            .await;

        assert_eq!(report.indexes.existing, 0);
        assert_eq!(report.indexes.failed, 1);
        assert_eq!(report.failures(), 1);
    }

    #[tokio::test]
    async fn extracted_schema_applies_once_then_only_finds_existing() {
        use crate::test_fixtures::InMemoryStore;
        use crate::use_cases::schema::ExtractSchema;

        let source = Arc::new(InMemoryStore::new("source"));
        source
            .define_collection(&json!({
                "name": "services",
                "type": 2,
                "schema": {"rule": {"type": "object", "required": ["nameEN"]}, "level": "strict", "message": "bad"},
            }))
            .await
            .unwrap();
        source
            .define_collection(&json!({"name": "categoryServices", "type": 3}))
            .await
            .unwrap();
        source
            .define_index("services", &json!({"type": "persistent", "fields": ["categoryId", "order"], "name": "idx_categoryId_order"}))
            .await
            .unwrap();
        source
            .define_graph(&json!({"name": "hierarchy", "edgeDefinitions": [], "orphanCollections": []}))
            .await
            .unwrap();
        source
            .define_view(&json!({"name": "search", "type": "arangosearch", "links": {}}))
            .await
            .unwrap();
        source
            .define_analyzer(&json!({"name": "text_nl", "type": "text", "properties": {}, "features": []}))
            .await
            .unwrap();

        let schema = ExtractSchema::new(source).execute("source").await.unwrap();
        assert_eq!(schema.analyzers[0].name, "text_nl");

        let target = Arc::new(InMemoryStore::new("target"));
        let first = CreateSchema::new(target.clone(), quiet_log())
            .execute(&schema)
            .await;
        assert_eq!(first.collections.created, 2);
        assert_eq!(first.failures(), 0);
        assert_eq!(
            target.collection_properties("services").await.unwrap()["schema"]["level"],
            "strict"
        );

        let second = CreateSchema::new(target, quiet_log()).execute(&schema).await;
        assert_eq!(second.collections.existing, 2);
        assert_eq!(second.graphs.existing, 1);
        assert_eq!(second.views.existing, 1);
        assert_eq!(second.analyzers.existing, 1);
        assert_eq!(second.failures(), 0);
    }
}
