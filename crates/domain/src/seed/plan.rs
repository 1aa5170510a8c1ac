use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;
use crate::hierarchy::{field_str, Record};

/// One category and the services to create under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub category: String,
    pub services: Vec<String>,
}

impl CategorySpec {
    pub fn new(category: impl Into<String>, services: Vec<String>) -> Self {
        Self {
            category: category.into(),
            services,
        }
    }
}

/// A validated list of categories with their services.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchySpec {
    entries: Vec<CategorySpec>,
}

impl HierarchySpec {
    /// Build from entries collected interactively. Names are trimmed.
    pub fn new(entries: Vec<CategorySpec>) -> Result<Self, DomainError> {
        let mut checked = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let category = entry.category.trim();
            if category.is_empty() {
                return Err(DomainError::validation(format!(
                    "Entry {index}: category name is empty"
                )));
            }
            let mut services = Vec::with_capacity(entry.services.len());
            for (position, service) in entry.services.iter().enumerate() {
                let service = service.trim();
                if service.is_empty() {
                    return Err(DomainError::validation(format!(
                        "Entry {index} ({category}): service {position} is empty"
                    )));
                }
                services.push(service.to_string());
            }
            checked.push(CategorySpec::new(category, services));
        }
        Ok(Self { entries: checked })
    }

    /// Parse a hierarchy file: `[{ "category": "...", "services": ["..."] }]`.
    pub fn parse(value: &Value) -> Result<Self, DomainError> {
        let Value::Array(items) = value else {
            return Err(DomainError::parse(
                "hierarchy file must contain a JSON array",
            ));
        };

        let mut entries = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let category = item
                .get("category")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    DomainError::parse(format!("Entry {index}: `category` must be a string"))
                })?;
            let services = match item.get("services") {
                Some(Value::Array(services)) => services
                    .iter()
                    .enumerate()
                    .map(|(position, s)| {
                        s.as_str().map(str::to_string).ok_or_else(|| {
                            DomainError::parse(format!(
                                "Entry {index}: service {position} must be a string"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                _ => {
                    return Err(DomainError::parse(format!(
                        "Entry {index}: `services` must be an array"
                    )))
                }
            };
            entries.push(CategorySpec::new(category, services));
        }

        Self::new(entries)
    }

    pub fn entries(&self) -> &[CategorySpec] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where new keys and orders start, derived from what the store already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceStart {
    pub category_order: i64,
    pub category_key: i64,
    pub service_key: i64,
}

impl SequenceStart {
    pub const FIRST_CATEGORY_KEY: i64 = 1;
    pub const FIRST_SERVICE_KEY: i64 = 101;

    pub fn from_existing(categories: &[Record], services: &[Record]) -> Self {
        let max_order = categories
            .iter()
            .filter_map(|c| c.get("order").and_then(Value::as_i64))
            .max();

        Self {
            category_order: max_order.map_or(1, |o| o + 1),
            category_key: max_numeric_key(categories).map_or(Self::FIRST_CATEGORY_KEY, |k| k + 1),
            service_key: max_numeric_key(services).map_or(Self::FIRST_SERVICE_KEY, |k| k + 1),
        }
    }
}

fn max_numeric_key(records: &[Record]) -> Option<i64> {
    records
        .iter()
        .filter_map(|r| field_str(r, "_key"))
        .filter_map(|k| k.parse::<i64>().ok())
        .max()
}
