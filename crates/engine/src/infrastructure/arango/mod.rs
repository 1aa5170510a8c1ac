//! ArangoDB HTTP adapter.
//!
//! One [`ArangoClient`] per database implements both store ports over the
//! REST API. Every call is scoped to `/_db/{database}`; database management
//! goes through `_system`.

mod client;
mod document_store;
mod schema_store;

pub use client::{ArangoClient, DEFAULT_STORE_TIMEOUT_SECS};
