//! Hierarchy export and import.

mod export;
mod import;
mod prepare;
mod verify;

use arangomig_domain::DomainError;

use crate::infrastructure::ports::StoreError;

pub use export::{ExportHierarchy, ExportOutcome};
pub use import::{CollectionImportStats, ImportHierarchy, ImportReport};
pub use prepare::{ensure_collection, import_indexes, prepare_target};
pub use verify::{verify_import, CollectionCheck, VerificationReport, SAMPLE_SIZE};

#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Database {0} does not exist")]
    MissingDatabase(String),
    #[error("Required collection {0} does not exist")]
    MissingCollection(String),
    #[error("No data: {0}")]
    NoData(String),
    #[error("Validation failed with {0} error(s)")]
    ValidationFailed(usize),
}
