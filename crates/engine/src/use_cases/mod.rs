//! Use cases - one struct per tool operation.
//!
//! Each use case holds its ports as `Arc<dyn ...>` and exposes `execute`.

pub mod hierarchy;
pub mod schema;
pub mod seed;

pub use hierarchy::{ExportHierarchy, HierarchyError, ImportHierarchy};
pub use schema::{CreateSchema, ExtractSchema, SchemaError};
pub use seed::{CreateHierarchy, CreateTranslations, SeedError};
