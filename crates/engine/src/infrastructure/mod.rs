//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod arango;
pub mod clock;
pub mod config;
pub mod ports;
pub mod run_log;
pub mod translate;
