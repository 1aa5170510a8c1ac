//! Seeding tools: build the hierarchy from a plan, then translate it.

mod create_hierarchy;
mod create_translations;

use arangomig_domain::DomainError;

use super::hierarchy::HierarchyError;
use crate::infrastructure::ports::StoreError;

pub use create_hierarchy::{CreateHierarchy, HierarchyCreationReport, InsertedCounts, SkippedCounts};
pub use create_translations::{CreateTranslations, TranslationReport, TranslationTally};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Prepare(#[from] HierarchyError),
    #[error("Required collection {0} does not exist")]
    MissingCollection(String),
}
