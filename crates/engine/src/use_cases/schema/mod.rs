//! Schema extraction and creation.

mod create;
mod extract;
mod rule_recovery;

use std::path::Path;

use arangomig_domain::{DomainError, SchemaDocument};

use crate::infrastructure::ports::StoreError;

pub use create::{CreateSchema, EntityTally, SchemaCreationReport, SCHEMA_LOG_FILE};
pub use extract::{ExtractSchema, DEFAULT_SCHEMA_FILE};
pub use rule_recovery::{
    default_strategies, AttributePeek, PropertiesField, RegistryQuery, RuleRecoveryStrategy,
};

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid schema document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write a schema document as pretty JSON.
pub async fn write_schema_file(schema: &SchemaDocument, path: &Path) -> Result<(), SchemaError> {
    let contents = serde_json::to_string_pretty(schema)?;
    tokio::fs::write(path, contents).await?;
    Ok(())
}

pub async fn read_schema_file(path: &Path) -> Result<SchemaDocument, SchemaError> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}
