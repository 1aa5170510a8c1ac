//! Error types for port operations.

/// ArangoDB error numbers the tools branch on.
pub mod error_num {
    pub const COLLECTION_NOT_FOUND: u64 = 1203;
    /// Duplicate collection or view name.
    pub const DUPLICATE_NAME: u64 = 1207;
    pub const GRAPH_DUPLICATE: u64 = 1925;
    pub const ANALYZER_DUPLICATE: u64 = 1650;
    pub const FUNCTION_DUPLICATE: u64 = 1582;
    pub const UNIQUE_CONSTRAINT_VIOLATED: u64 = 1210;
}

/// Store operation errors with context for debugging.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The server answered with an error body.
    #[error("{operation} failed (HTTP {status}, errorNum {error_num:?}): {message}")]
    Api {
        operation: &'static str,
        status: u16,
        error_num: Option<u64>,
        message: String,
    },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("{operation} request failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn api(
        operation: &'static str,
        status: u16,
        error_num: Option<u64>,
        message: impl ToString,
    ) -> Self {
        Self::Api {
            operation,
            status,
            error_num,
            message: message.to_string(),
        }
    }

    pub fn request(operation: &'static str, message: impl ToString) -> Self {
        Self::Request {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    /// "Already exists": the error number is one of `codes`. A 409 without
    /// an error number also counts; a 409 carrying any other number (such as
    /// a unique constraint violation) does not.
    pub fn is_conflict(&self, codes: &[u64]) -> bool {
        match self {
            Self::Api {
                error_num: Some(n), ..
            } => codes.contains(n),
            Self::Api {
                status,
                error_num: None,
                ..
            } => *status == 409,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TranslateError {
    #[error("Translation request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
