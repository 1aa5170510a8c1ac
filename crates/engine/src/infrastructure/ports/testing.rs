//! Testability and reporting ports.

use std::path::Path;

use chrono::{DateTime, Utc};

// =============================================================================
// Testability Ports
// =============================================================================

pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// =============================================================================
// Run Log
// =============================================================================

/// Line-oriented run log that can be written out after the run.
#[cfg_attr(test, mockall::automock)]
pub trait RunLog: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    /// Write every buffered line to `path`.
    fn flush(&self, path: &Path) -> std::io::Result<()>;
}
