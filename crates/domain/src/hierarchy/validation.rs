//! Pre-import checks over a decoded dataset.
//!
//! Missing required fields and duplicate `_key`s are errors. Dangling
//! references, duplicate edge pairs and non-numeric `order` values are
//! warnings.

use std::collections::HashSet;

use serde_json::Value;

use super::{
    field_str, projection_for, strip_collection_prefix, HierarchyCollection, HierarchyDataset,
};

/// How many errors or warnings are printed before the rest is summarised.
pub const MAX_REPORTED_ISSUES: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate_dataset(dataset: &HierarchyDataset) -> ValidationReport {
    let mut report = ValidationReport::default();

    for collection in HierarchyCollection::ALL {
        if collection.is_edge() {
            check_edges(dataset, collection, &mut report);
        } else {
            check_documents(dataset, collection, &mut report);
        }
    }

    report
}

fn check_documents(
    dataset: &HierarchyDataset,
    collection: HierarchyCollection,
    report: &mut ValidationReport,
) {
    let projection = projection_for(collection);
    let label = collection.label();
    let mut seen = HashSet::new();
    let parent = collection
        .parent_reference()
        .map(|(field, target)| (field, target, dataset.keys(target)));

    for (index, record) in dataset.records(collection).iter().enumerate() {
        let missing = projection.missing_or_null_fields(record);
        if !missing.is_empty() {
            report.errors.push(format!(
                "{label} {index}: Missing required fields: {}",
                missing.join(", ")
            ));
        }

        if let Some(key) = field_str(record, "_key") {
            if !seen.insert(key.clone()) {
                report
                    .errors
                    .push(format!("{label} {index}: Duplicate _key: {key}"));
            }
        }

        if matches!(
            collection,
            HierarchyCollection::Categories | HierarchyCollection::Services
        ) {
            if let Some(order) = record.get("order").filter(|v| !v.is_number()) {
                report.warnings.push(format!(
                    "{label} {index}: order field should be a number, got: {}",
                    json_type_name(order)
                ));
            }
        }

        if let Some((field, target, keys)) = &parent {
            if let Some(reference) = field_str(record, field) {
                let key = strip_collection_prefix(&reference);
                if !keys.contains(key) {
                    report.warnings.push(format!(
                        "{label} {index}: {field} '{reference}' (extracted: '{key}') not found in {target}"
                    ));
                }
            }
        }
    }
}

fn check_edges(
    dataset: &HierarchyDataset,
    collection: HierarchyCollection,
    report: &mut ValidationReport,
) {
    let projection = projection_for(collection);
    let label = collection.label();
    let Some((from_collection, to_collection)) = collection.edge_endpoints() else {
        return;
    };
    let from_keys = dataset.keys(from_collection);
    let to_keys = dataset.keys(to_collection);
    let mut pairs = HashSet::new();

    for (index, record) in dataset.records(collection).iter().enumerate() {
        let missing = projection.missing_or_null_fields(record);
        if !missing.is_empty() {
            report.errors.push(format!(
                "{label} {index}: Missing required fields: {}",
                missing.join(", ")
            ));
        }

        let from = field_str(record, "_from");
        let to = field_str(record, "_to");

        if let Some(from) = &from {
            if !from_keys.contains(strip_collection_prefix(from)) {
                report.warnings.push(format!(
                    "{label} {index}: _from '{from}' references non-existent {from_collection}"
                ));
            }
        }
        if let Some(to) = &to {
            if !to_keys.contains(strip_collection_prefix(to)) {
                report.warnings.push(format!(
                    "{label} {index}: _to '{to}' references non-existent {to_collection}"
                ));
            }
        }

        let pair = (from.unwrap_or_default(), to.unwrap_or_default());
        if !pairs.insert(pair.clone()) {
            report.warnings.push(format!(
                "{label} {index}: Duplicate edge from {} to {}",
                pair.0, pair.1
            ));
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Record;
    use serde_json::json;

    fn records(values: Value) -> Vec<Record> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn base_dataset() -> HierarchyDataset {
        HierarchyDataset::new()
            .with(
                HierarchyCollection::Categories,
                records(json!([
                    {"_key": "1", "nameEN": "Health", "order": 1},
                    {"_key": "2", "nameEN": "Tax", "order": 2}
                ])),
            )
            .with(
                HierarchyCollection::Services,
                records(json!([
                    {"_key": "101", "categoryId": "1", "nameEN": "Clinics", "order": 1}
                ])),
            )
    }

    #[test]
    fn clean_dataset_has_no_issues() {
        let report = validate_dataset(&base_dataset());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn missing_name_is_an_error() {
        let dataset = base_dataset().with(
            HierarchyCollection::Categories,
            records(json!([{"_key": "1", "order": 1}, {"_key": "2", "nameEN": null, "order": 2}])),
        );
        let report = validate_dataset(&dataset);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("Missing required fields: nameEN"));
    }

    #[test]
    fn duplicate_key_is_an_error() {
        let dataset = base_dataset().with(
            HierarchyCollection::Categories,
            records(json!([
                {"_key": "1", "nameEN": "Health", "order": 1},
                {"_key": "1", "nameEN": "Tax", "order": 2}
            ])),
        );
        let report = validate_dataset(&dataset);
        assert!(!report.is_valid());
        assert!(report.errors[0].contains("Duplicate _key: 1"));
    }

    #[test]
    fn dangling_category_reference_is_only_a_warning() {
        let dataset = base_dataset().with(
            HierarchyCollection::Services,
            records(json!([
                {"_key": "101", "categoryId": "serviceCategories/99", "nameEN": "Orphan", "order": 1}
            ])),
        );
        let report = validate_dataset(&dataset);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("extracted: '99'"));
    }

    #[test]
    fn prefixed_category_reference_resolves() {
        let dataset = base_dataset().with(
            HierarchyCollection::Services,
            records(json!([
                {"_key": "101", "categoryId": "serviceCategories/1", "nameEN": "Clinics", "order": 1}
            ])),
        );
        assert!(validate_dataset(&dataset).warnings.is_empty());
    }

    #[test]
    fn edge_checks_endpoints_and_duplicates() {
        let dataset = base_dataset().with(
            HierarchyCollection::CategoryServices,
            records(json!([
                {"_from": "serviceCategories/1", "_to": "services/101"},
                {"_from": "serviceCategories/1", "_to": "services/101"},
                {"_from": "serviceCategories/7", "_to": "services/555"},
                {"_from": "serviceCategories/1"}
            ])),
        );
        let report = validate_dataset(&dataset);

        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("_to"));
        assert!(report.warnings.iter().any(|w| w.contains("Duplicate edge")));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("_from 'serviceCategories/7'")));
        assert!(report.warnings.iter().any(|w| w.contains("_to 'services/555'")));
    }

    #[test]
    fn string_order_is_a_warning() {
        let dataset = base_dataset().with(
            HierarchyCollection::Categories,
            records(json!([{"_key": "1", "nameEN": "Health", "order": "1"}])),
        );
        let report = validate_dataset(&dataset);
        assert!(report.is_valid());
        assert!(report.warnings[0].contains("got: string"));
    }
}
