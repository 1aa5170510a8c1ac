//! Unified error type for the domain layer
//!
//! Every pure rule in this crate reports failures through [`DomainError`] so
//! the engine can wrap it without string matching.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed a structural or field-level check
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Value could not be parsed into a domain type
    #[error("Parse error: {0}")]
    Parse(String),

    /// Export file carries a shape or version marker we do not recognise
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl DomainError {
    /// Create a validation error.
    ///
    /// # Example
    /// ```ignore
    /// if entries.is_empty() {
    ///     return Err(DomainError::validation("Hierarchy file has no categories"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an unsupported format error
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category_prefix() {
        let err = DomainError::unsupported_format("exportVersion 9.9");
        assert_eq!(err.to_string(), "Unsupported format: exportVersion 9.9");
    }
}
