//! Arangomig engine library.
//!
//! Store access, use cases and the command-line surface of the migration
//! tools.
//!
//! ## Structure
//!
//! - `infrastructure/` - ports plus their ArangoDB, translation, clock,
//!   config and run-log implementations
//! - `use_cases/` - schema extraction/creation, hierarchy export/import,
//!   hierarchy and translation seeding
//! - `cli` - clap commands and their composition

pub mod cli;
pub mod infrastructure;
pub mod use_cases;

/// Test fixtures module for multi-step use case tests.
#[cfg(test)]
pub mod test_fixtures;
