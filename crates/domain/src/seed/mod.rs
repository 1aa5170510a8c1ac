//! Plans for seeding the hierarchy from scratch.

mod plan;
mod translation;

pub use plan::{CategorySpec, HierarchySpec, SequenceStart};
pub use translation::{fallback_translation, translation_key, LanguageCode};
