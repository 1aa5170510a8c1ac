//! Per-collection field rules.
//!
//! One [`CollectionProjection`] per hierarchy collection drives the clean
//! export projection and its sort order, the export schema descriptor,
//! required-field checks, and the strict/lenient cleanup applied before a
//! record is written.

use std::cmp::Ordering;

use serde_json::{json, Map, Value};

use super::{HierarchyCollection, Record};

/// One property of the export schema descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub json_type: &'static str,
    pub optional: bool,
}

const fn field(name: &'static str, json_type: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        json_type,
        optional: false,
    }
}

const fn optional(name: &'static str, json_type: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        json_type,
        optional: true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionProjection {
    pub collection: HierarchyCollection,
    /// Fields kept by a clean export, in output order.
    pub export_fields: &'static [&'static str],
    /// Sort keys applied to exported records, most significant first.
    pub sort_keys: &'static [&'static str],
    /// Properties of the descriptor written into the export's `schemas`.
    pub descriptor_fields: &'static [FieldSpec],
    pub descriptor_required: &'static [&'static str],
    /// Fields that must be present (and non-null on import) on every record.
    pub required: &'static [&'static str],
    /// Strict import: copied whenever the source has them.
    pub strict_fields: &'static [&'static str],
    /// Strict import: copied only when non-null.
    pub strict_optional: &'static [&'static str],
}

const CATEGORIES: CollectionProjection = CollectionProjection {
    collection: HierarchyCollection::Categories,
    export_fields: &["_key", "nameEN", "nameFR", "nameSW", "order", "createdAt", "updatedAt"],
    sort_keys: &["order"],
    descriptor_fields: &[
        field("_key", "string"),
        field("nameEN", "string"),
        optional("nameFR", "string"),
        optional("nameSW", "string"),
        field("order", "number"),
    ],
    descriptor_required: &["_key", "nameEN", "order"],
    required: &["_key", "nameEN", "order"],
    strict_fields: &["_key", "nameEN", "order"],
    strict_optional: &["nameFR", "nameSW"],
};

const SERVICES: CollectionProjection = CollectionProjection {
    collection: HierarchyCollection::Services,
    export_fields: &[
        "_key",
        "categoryId",
        "nameEN",
        "nameFR",
        "nameSW",
        "description",
        "order",
        "createdAt",
        "updatedAt",
    ],
    sort_keys: &["categoryId", "order"],
    descriptor_fields: &[
        field("_key", "string"),
        field("categoryId", "string"),
        field("nameEN", "string"),
        optional("nameFR", "string"),
        optional("nameSW", "string"),
        optional("description", "string"),
        field("order", "number"),
    ],
    descriptor_required: &["_key", "categoryId", "nameEN", "order"],
    required: &["_key", "categoryId", "nameEN", "order"],
    strict_fields: &["_key", "categoryId", "nameEN", "order"],
    strict_optional: &["nameFR", "nameSW", "description"],
};

const CATEGORY_SERVICES: CollectionProjection = CollectionProjection {
    collection: HierarchyCollection::CategoryServices,
    export_fields: &["_key", "_from", "_to", "order", "createdAt"],
    sort_keys: &["_from", "order"],
    descriptor_fields: &[
        field("_from", "string"),
        field("_to", "string"),
        optional("order", "number"),
    ],
    descriptor_required: &["_from", "_to"],
    required: &["_from", "_to"],
    strict_fields: &["_from", "_to"],
    strict_optional: &["order", "_key"],
};

const CATEGORY_TRANSLATIONS: CollectionProjection = CollectionProjection {
    collection: HierarchyCollection::CategoryTranslations,
    export_fields: &[
        "_key",
        "serviceCategoryId",
        "languageCode",
        "translation",
        "isActive",
        "createdAt",
        "updatedAt",
    ],
    sort_keys: &["serviceCategoryId", "languageCode"],
    descriptor_fields: &[
        field("_key", "string"),
        field("serviceCategoryId", "string"),
        field("languageCode", "string"),
        field("translation", "string"),
        field("isActive", "boolean"),
        optional("createdAt", "string"),
        optional("updatedAt", "string"),
    ],
    descriptor_required: &["_key", "serviceCategoryId", "languageCode", "translation"],
    required: &["_key", "serviceCategoryId", "languageCode", "translation"],
    strict_fields: &["_key", "serviceCategoryId", "languageCode", "translation", "isActive"],
    strict_optional: &["createdAt", "updatedAt"],
};

const SERVICE_TRANSLATIONS: CollectionProjection = CollectionProjection {
    collection: HierarchyCollection::ServiceTranslations,
    export_fields: &[
        "_key",
        "serviceId",
        "languageCode",
        "translation",
        "isActive",
        "createdAt",
        "updatedAt",
    ],
    sort_keys: &["serviceId", "languageCode"],
    descriptor_fields: &[
        field("_key", "string"),
        field("serviceId", "string"),
        field("languageCode", "string"),
        field("translation", "string"),
        field("isActive", "boolean"),
        optional("createdAt", "string"),
        optional("updatedAt", "string"),
    ],
    descriptor_required: &["_key", "serviceId", "languageCode", "translation"],
    required: &["_key", "serviceId", "languageCode", "translation"],
    strict_fields: &["_key", "serviceId", "languageCode", "translation", "isActive"],
    strict_optional: &["createdAt", "updatedAt"],
};

const TRANSLATION_EDGE_DESCRIPTOR: &[FieldSpec] = &[
    field("_key", "string"),
    field("_from", "string"),
    field("_to", "string"),
    optional("createdAt", "string"),
];

const CATEGORY_TRANSLATION_EDGES: CollectionProjection = CollectionProjection {
    collection: HierarchyCollection::CategoryTranslationEdges,
    export_fields: &["_key", "_from", "_to", "createdAt"],
    sort_keys: &["_from"],
    descriptor_fields: TRANSLATION_EDGE_DESCRIPTOR,
    descriptor_required: &["_key", "_from", "_to"],
    required: &["_from", "_to"],
    strict_fields: &["_key", "_from", "_to"],
    strict_optional: &["createdAt"],
};

const SERVICE_TRANSLATION_EDGES: CollectionProjection = CollectionProjection {
    collection: HierarchyCollection::ServiceTranslationEdges,
    ..CATEGORY_TRANSLATION_EDGES
};

/// Look up the field rules for a collection.
pub fn projection_for(collection: HierarchyCollection) -> &'static CollectionProjection {
    match collection {
        HierarchyCollection::Categories => &CATEGORIES,
        HierarchyCollection::Services => &SERVICES,
        HierarchyCollection::CategoryServices => &CATEGORY_SERVICES,
        HierarchyCollection::CategoryTranslations => &CATEGORY_TRANSLATIONS,
        HierarchyCollection::CategoryTranslationEdges => &CATEGORY_TRANSLATION_EDGES,
        HierarchyCollection::ServiceTranslations => &SERVICE_TRANSLATIONS,
        HierarchyCollection::ServiceTranslationEdges => &SERVICE_TRANSLATION_EDGES,
    }
}

impl CollectionProjection {
    /// Clean export projection. Missing fields become `null`.
    pub fn project_for_export(&self, record: &Record) -> Record {
        self.export_fields
            .iter()
            .map(|name| {
                (
                    (*name).to_string(),
                    record.get(*name).cloned().unwrap_or(Value::Null),
                )
            })
            .collect()
    }

    /// Sort records in place by this collection's sort keys.
    pub fn sort(&self, records: &mut [Record]) {
        records.sort_by(|a, b| {
            self.sort_keys
                .iter()
                .map(|key| {
                    compare_values(
                        a.get(*key).unwrap_or(&Value::Null),
                        b.get(*key).unwrap_or(&Value::Null),
                    )
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    /// JSON-schema style descriptor for the export's `schemas` section.
    pub fn descriptor(&self) -> Value {
        let properties: Map<String, Value> = self
            .descriptor_fields
            .iter()
            .map(|spec| {
                let mut prop = json!({ "type": spec.json_type });
                if spec.optional {
                    prop["optional"] = json!(true);
                }
                (spec.name.to_string(), prop)
            })
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": self.descriptor_required,
        })
    }

    /// Required fields that are absent from the record.
    pub fn missing_fields(&self, record: &Record) -> Vec<&'static str> {
        self.required
            .iter()
            .copied()
            .filter(|name| !record.contains_key(*name))
            .collect()
    }

    /// Required fields that are absent or `null`.
    pub fn missing_or_null_fields(&self, record: &Record) -> Vec<&'static str> {
        self.required
            .iter()
            .copied()
            .filter(|name| record.get(*name).map_or(true, Value::is_null))
            .collect()
    }

    /// Strict cleanup: keep only the allow-listed fields.
    pub fn clean_strict(&self, record: &Record) -> Record {
        let mut cleaned = Record::new();
        for name in self.strict_fields {
            if let Some(value) = record.get(*name) {
                cleaned.insert((*name).to_string(), value.clone());
            }
        }
        for name in self.strict_optional {
            if let Some(value) = record.get(*name).filter(|v| !v.is_null()) {
                cleaned.insert((*name).to_string(), value.clone());
            }
        }
        cleaned
    }

    /// Lenient cleanup: drop null fields and back-fill timestamps on
    /// document collections.
    pub fn clean_lenient(&self, record: &Record, now: &str) -> Record {
        let mut cleaned: Record = record
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if !self.collection.is_edge() {
            for stamp in ["createdAt", "updatedAt"] {
                if !is_truthy(cleaned.get(stamp)) {
                    cleaned.insert(stamp.to_string(), json!(now));
                }
            }
        }
        cleaned
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(_) => true,
    }
}

/// Total order over JSON values matching the store's sort order:
/// null < bool < number < string < array < object.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(l, r)| compare_values(l, r))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => rank(a).cmp(&rank(b)),
    }
}
