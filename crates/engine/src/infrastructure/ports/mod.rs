//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Store access (schema entities and documents)
//! - Machine translation
//! - Clock and run log (for testing)

mod error;
mod external;
mod store;
mod testing;

// =============================================================================
// Store Ports
// =============================================================================
pub use error::{error_num, StoreError, TranslateError};
pub use store::{CollectionInfo, DocumentStore, SchemaStore};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::Translator;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RunLog};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use store::{MockDocumentStore, MockSchemaStore};

#[cfg(test)]
pub use external::MockTranslator;

#[cfg(test)]
pub use testing::MockRunLog;
