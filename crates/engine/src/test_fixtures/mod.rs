//! Test fixtures shared by use case tests.
//!
//! [`InMemoryStore`] stands in for a whole ArangoDB database when a scenario
//! spans several store calls (export then import, a second idempotent run).
//! Single-call expectations use the mockall port mocks instead.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{record, InMemoryStore};
//!
//! let store = InMemoryStore::new("target").with_hierarchy_collections();
//! store.seed("serviceCategories", vec![record(json!({"_key": "1"}))]).await;
//! ```

mod memory_store;

pub use memory_store::InMemoryStore;

use arangomig_domain::Record;
use serde_json::Value;

/// Unwrap a `json!({...})` literal into a record.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// [`record`] over a `json!([...])` literal.
pub fn records(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items.into_iter().map(record).collect(),
        other => panic!("expected a JSON array, got {other}"),
    }
}
