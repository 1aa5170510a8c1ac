//! Target database preparation.

use arangomig_domain::HierarchyCollection;
use serde_json::{json, Value};

use super::HierarchyError;
use crate::infrastructure::ports::{error_num, DocumentStore};

/// Secondary indexes created alongside a collection by the importer.
pub fn import_indexes(collection: HierarchyCollection) -> Vec<Value> {
    match collection {
        HierarchyCollection::Services => vec![json!({
            "type": "persistent",
            "fields": ["categoryId", "order"],
            "name": "idx_categoryId_order",
        })],
        HierarchyCollection::CategoryServices => vec![json!({
            "type": "skiplist",
            "fields": ["createdAt"],
            "name": "idx_createdAt",
        })],
        HierarchyCollection::CategoryTranslations => vec![
            json!({
                "type": "hash",
                "fields": ["serviceCategoryId", "languageCode"],
                "unique": true,
                "name": "idx_serviceCategory_language",
            }),
            json!({"type": "skiplist", "fields": ["serviceCategoryId"], "name": "idx_serviceCategoryId"}),
            json!({"type": "skiplist", "fields": ["languageCode"], "name": "idx_languageCode"}),
        ],
        HierarchyCollection::ServiceTranslations => vec![
            json!({
                "type": "hash",
                "fields": ["serviceId", "languageCode"],
                "unique": true,
                "name": "idx_service_language",
            }),
            json!({"type": "skiplist", "fields": ["serviceId"], "name": "idx_serviceId"}),
            json!({"type": "skiplist", "fields": ["languageCode"], "name": "idx_languageCode"}),
        ],
        HierarchyCollection::Categories
        | HierarchyCollection::CategoryTranslationEdges
        | HierarchyCollection::ServiceTranslationEdges => Vec::new(),
    }
}

/// Make sure `collection` exists, creating it with `indexes` when allowed.
///
/// Returns whether the collection was created. Index failures are logged,
/// not returned.
pub async fn ensure_collection(
    store: &dyn DocumentStore,
    collection: HierarchyCollection,
    create: bool,
    indexes: &[Value],
) -> Result<bool, HierarchyError> {
    if store.collection_exists(collection.name()).await? {
        return Ok(false);
    }
    if !create {
        return Err(HierarchyError::MissingCollection(collection.name().to_string()));
    }

    match store.create_collection(collection.name(), collection.kind()).await {
        Ok(()) => {}
        Err(e) if e.is_conflict(&[error_num::DUPLICATE_NAME]) => return Ok(false),
        Err(e) => return Err(e.into()),
    }
    tracing::info!(collection = %collection, kind = collection.kind().as_str(), "Created collection");

    for index in indexes {
        if let Err(e) = store.ensure_index(collection.name(), index).await {
            tracing::warn!(
                collection = %collection,
                index = %index["name"],
                error = %e,
                "Could not create index"
            );
        }
    }
    Ok(true)
}

/// Create the database and any missing hierarchy collections, then log
/// current document counts.
pub async fn prepare_target(
    store: &dyn DocumentStore,
    database: &str,
    create_database: bool,
    create_collections: bool,
) -> Result<(), HierarchyError> {
    if !store.database_exists(database).await? {
        if !create_database {
            return Err(HierarchyError::MissingDatabase(database.to_string()));
        }
        store.create_database(database).await?;
        tracing::info!(database, "Created database");
    }

    for collection in HierarchyCollection::ALL {
        ensure_collection(
            store,
            collection,
            create_collections,
            &import_indexes(collection),
        )
        .await?;
    }

    for collection in HierarchyCollection::ALL {
        match store.count(collection.name()).await {
            Ok(count) => tracing::info!(collection = %collection, count, "Existing documents"),
            Err(e) => tracing::warn!(collection = %collection, error = %e, "Could not count documents"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockDocumentStore;
    use arangomig_domain::CollectionKind;
    use mockall::predicate::*;

    #[test]
    fn translation_collections_get_unique_language_index() {
        let indexes = import_indexes(HierarchyCollection::ServiceTranslations);
        assert_eq!(indexes.len(), 3);
        assert_eq!(indexes[0]["unique"], true);
        assert_eq!(indexes[0]["fields"], json!(["serviceId", "languageCode"]));
        assert!(import_indexes(HierarchyCollection::ServiceTranslationEdges).is_empty());
    }

    #[tokio::test]
    async fn creates_missing_edge_collection_with_indexes() {
        let mut store = MockDocumentStore::new();
        store
            .expect_collection_exists()
            .with(eq("categoryServices"))
            .returning(|_| Ok(false));
        store
            .expect_create_collection()
            .with(eq("categoryServices"), eq(CollectionKind::Edge))
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_ensure_index()
            .times(1)
            .returning(|_, _| Ok(()));

        let created = ensure_collection(
            &store,
            HierarchyCollection::CategoryServices,
            true,
            &import_indexes(HierarchyCollection::CategoryServices),
        )
        .await
        .unwrap();
        assert!(created);
    }

    #[tokio::test]
    async fn missing_collection_without_create_is_fatal() {
        let mut store = MockDocumentStore::new();
        store.expect_collection_exists().returning(|_| Ok(false));
        store.expect_create_collection().never();

        let result = ensure_collection(&store, HierarchyCollection::Services, false, &[]).await;
        assert!(matches!(result, Err(HierarchyError::MissingCollection(name)) if name == "services"));
    }

    #[tokio::test]
    async fn missing_database_without_create_is_fatal() {
        let mut store = MockDocumentStore::new();
        store.expect_database_exists().returning(|_| Ok(false));
        store.expect_create_database().never();

        let result = prepare_target(&store, "target", false, true).await;
        assert!(matches!(result, Err(HierarchyError::MissingDatabase(_))));
    }
}
