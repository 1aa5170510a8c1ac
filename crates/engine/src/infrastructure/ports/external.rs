//! External service ports.

use async_trait::async_trait;

use super::TranslateError;

/// Machine translation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text`; language codes are lower-case ISO codes (`en`, `fr`).
    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, TranslateError>;
}
