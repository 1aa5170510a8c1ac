use std::fmt;

use crate::error::DomainError;

/// Upper-case target language code. English is the source language and is
/// never a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let code = raw.trim().to_uppercase();
        if code.is_empty() {
            return Err(DomainError::validation("language code is required"));
        }
        if code == "EN" {
            return Err(DomainError::validation(
                "EN is the source language; choose another target",
            ));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-case form expected by the translation API.
    pub fn api_code(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `_key` of a translation document: `<parentKey>_<LANG>`.
pub fn translation_key(parent_key: &str, language: &LanguageCode) -> String {
    format!("{parent_key}_{language}")
}

/// Text stored when the translation call fails.
pub fn fallback_translation(text: &str, language: &LanguageCode) -> String {
    format!("{text} ({language})")
}
