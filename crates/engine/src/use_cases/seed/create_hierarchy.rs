//! Category and service creation from a [`HierarchySpec`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use arangomig_domain::{
    field_str, HierarchyCollection, HierarchySpec, Record, SequenceStart,
};
use chrono::SecondsFormat;
use serde_json::{json, Value};

use super::SeedError;
use crate::infrastructure::ports::{ClockPort, DocumentStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertedCounts {
    pub categories: usize,
    pub services: usize,
    pub edges: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkippedCounts {
    pub categories: usize,
    pub services: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HierarchyCreationReport {
    pub inserted: InsertedCounts,
    pub skipped: SkippedCounts,
}

impl fmt::Display for HierarchyCreationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inserted {} categories, {} services, {} edges; skipped {} categories, {} services",
            self.inserted.categories,
            self.inserted.services,
            self.inserted.edges,
            self.skipped.categories,
            self.skipped.services
        )
    }
}

/// Insert categories, services and their edges, reusing anything that
/// already exists under the same English name.
pub struct CreateHierarchy {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn ClockPort>,
}

impl CreateHierarchy {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn ClockPort>) -> Self {
        Self { store, clock }
    }

    pub async fn execute(&self, spec: &HierarchySpec) -> Result<HierarchyCreationReport, SeedError> {
        for collection in [
            HierarchyCollection::Categories,
            HierarchyCollection::Services,
            HierarchyCollection::CategoryServices,
        ] {
            if !self.store.collection_exists(collection.name()).await? {
                return Err(SeedError::MissingCollection(collection.name().to_string()));
            }
        }

        let categories = self
            .store
            .all_documents(HierarchyCollection::Categories.name())
            .await?;
        let services = self
            .store
            .all_documents(HierarchyCollection::Services.name())
            .await?;
        let mut next = SequenceStart::from_existing(&categories, &services);
        tracing::info!(
            category_order = next.category_order,
            category_key = next.category_key,
            service_key = next.service_key,
            "Starting sequence"
        );

        let mut category_keys: HashMap<String, String> = categories
            .iter()
            .filter_map(|c| Some((field_str(c, "nameEN")?, field_str(c, "_key")?)))
            .collect();
        let mut service_names: HashSet<(String, String)> = services
            .iter()
            .filter_map(|s| Some((field_str(s, "categoryId")?, field_str(s, "nameEN")?)))
            .collect();

        let now = self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut report = HierarchyCreationReport::default();

        for entry in spec.entries() {
            let category_key = match category_keys.get(&entry.category) {
                Some(key) => {
                    tracing::info!(category = %entry.category, key = %key, "Category exists, skipping");
                    report.skipped.categories += 1;
                    key.clone()
                }
                None => {
                    let key = next.category_key.to_string();
                    let category = record(json!({
                        "_key": key,
                        "nameEN": entry.category,
                        "order": next.category_order,
                        "createdAt": now,
                        "updatedAt": now,
                    }));
                    self.store
                        .insert(HierarchyCollection::Categories.name(), &category)
                        .await?;
                    tracing::info!(category = %entry.category, key = %key, order = next.category_order, "Created category");
                    next.category_key += 1;
                    next.category_order += 1;
                    report.inserted.categories += 1;
                    category_keys.insert(entry.category.clone(), key.clone());
                    key
                }
            };

            let mut service_order = 1;
            for service in &entry.services {
                if !service_names.insert((category_key.clone(), service.clone())) {
                    tracing::info!(service = %service, category = %entry.category, "Service exists, skipping");
                    report.skipped.services += 1;
                    continue;
                }

                let key = next.service_key.to_string();
                let document = record(json!({
                    "_key": key,
                    "categoryId": category_key,
                    "nameEN": service,
                    "order": service_order,
                    "createdAt": now,
                    "updatedAt": now,
                }));
                self.store
                    .insert(HierarchyCollection::Services.name(), &document)
                    .await?;

                let edge = record(json!({
                    "_from": format!("{}/{category_key}", HierarchyCollection::Categories),
                    "_to": format!("{}/{key}", HierarchyCollection::Services),
                    "createdAt": now,
                }));
                self.store
                    .insert(HierarchyCollection::CategoryServices.name(), &edge)
                    .await?;

                tracing::info!(service = %service, key = %key, category = %category_key, "Created service");
                next.service_key += 1;
                service_order += 1;
                report.inserted.services += 1;
                report.inserted.edges += 1;
            }
        }

        tracing::info!("{report}");
        Ok(report)
    }
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}
