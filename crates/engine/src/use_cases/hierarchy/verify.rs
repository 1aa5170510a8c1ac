//! Post-import verification.
//!
//! Compares expected and stored counts, looks up a few sample records per
//! collection and logs a category → service → translation overview. Only the
//! sample lookups decide the outcome.

use arangomig_domain::{field_str, HierarchyCollection, HierarchyDataset, Record};
use serde_json::{json, Value};

use crate::infrastructure::ports::DocumentStore;

/// Records looked up per collection.
pub const SAMPLE_SIZE: usize = 3;

/// Categories included in the relationship overview.
const OVERVIEW_CATEGORIES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionCheck {
    pub collection: HierarchyCollection,
    /// Records in the import file.
    pub expected: usize,
    /// Documents in the store after the import; `None` if counting failed.
    pub actual: Option<u64>,
    pub sampled: usize,
    pub found: usize,
}

impl CollectionCheck {
    pub fn passed(&self) -> bool {
        self.found == self.sampled
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerificationReport {
    pub checks: Vec<CollectionCheck>,
    pub overview: Vec<Value>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(CollectionCheck::passed)
    }
}

pub async fn verify_import(store: &dyn DocumentStore, dataset: &HierarchyDataset) -> VerificationReport {
    let mut report = VerificationReport::default();

    for collection in HierarchyCollection::ALL {
        let records = dataset.records(collection);
        let actual = match store.count(collection.name()).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(collection = %collection, error = %e, "Could not count documents");
                None
            }
        };

        let samples = &records[..records.len().min(SAMPLE_SIZE)];
        let mut found = 0;
        for record in samples {
            if sample_present(store, collection, record).await {
                found += 1;
            }
        }

        let check = CollectionCheck {
            collection,
            expected: records.len(),
            actual,
            sampled: samples.len(),
            found,
        };
        tracing::info!(
            collection = %collection,
            expected = check.expected,
            actual = ?check.actual,
            sampled = check.sampled,
            found = check.found,
            "Verification"
        );
        report.checks.push(check);
    }

    match store.hierarchy_sample(OVERVIEW_CATEGORIES).await {
        Ok(overview) => {
            for entry in &overview {
                tracing::info!(
                    category = %entry["nameEN"],
                    services = entry["services"].as_array().map_or(0, Vec::len),
                    translations = entry["translations"].as_array().map_or(0, Vec::len),
                    "Relationship check"
                );
            }
            report.overview = overview;
        }
        Err(e) => tracing::warn!(error = %e, "Relationship check failed"),
    }

    report
}

async fn sample_present(
    store: &dyn DocumentStore,
    collection: HierarchyCollection,
    record: &Record,
) -> bool {
    let lookup = if collection.is_edge() {
        let (Some(from), Some(to)) = (field_str(record, "_from"), field_str(record, "_to")) else {
            return false;
        };
        let filter = json!({ "_from": from, "_to": to });
        match filter {
            Value::Object(filter) => store.find_first(collection.name(), &filter).await,
            _ => return false,
        }
    } else {
        let Some(key) = field_str(record, "_key") else {
            return false;
        };
        store.document(collection.name(), &key).await
    };

    match lookup {
        Ok(found) => found.is_some(),
        Err(e) => {
            tracing::warn!(collection = %collection, error = %e, "Sample lookup failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockDocumentStore, StoreError};

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn passes_when_every_sample_is_found() {
        let dataset = HierarchyDataset::new()
            .with(
                HierarchyCollection::Categories,
                (1..=5).map(|i| record(json!({"_key": i.to_string()}))).collect(),
            )
            .with(
                HierarchyCollection::CategoryServices,
                vec![record(json!({"_from": "serviceCategories/1", "_to": "services/101"}))],
            );

        let mut store = MockDocumentStore::new();
        store.expect_count().returning(|_| Ok(5));
        store
            .expect_document()
            .times(SAMPLE_SIZE)
            .returning(|_, key| Ok(Some(record(json!({"_key": key})))));
        store
            .expect_find_first()
            .withf(|c: &str, f: &Record| c == "categoryServices" && f["_to"] == "services/101")
            .returning(|_, f| Ok(Some(f.clone())));
        store
            .expect_hierarchy_sample()
            .returning(|_| Err(StoreError::request("query", "timeout")));

        let report = verify_import(&store, &dataset).await;
        assert!(report.passed());
        assert_eq!(report.checks[0].sampled, 3);
        assert_eq!(report.checks[0].expected, 5);
    }

    #[tokio::test]
    async fn missing_sample_fails_verification() {
        let dataset = HierarchyDataset::new().with(
            HierarchyCollection::Services,
            vec![record(json!({"_key": "101"})), record(json!({"_key": "102"}))],
        );

        let mut store = MockDocumentStore::new();
        store.expect_count().returning(|_| Ok(1));
        store
            .expect_document()
            .returning(|_, key| Ok((key == "101").then(|| record(json!({"_key": "101"})))));
        store.expect_hierarchy_sample().returning(|_| Ok(vec![]));

        let report = verify_import(&store, &dataset).await;
        assert!(!report.passed());
        let services = report
            .checks
            .iter()
            .find(|c| c.collection == HierarchyCollection::Services)
            .unwrap();
        assert_eq!((services.sampled, services.found), (2, 1));
    }
}
