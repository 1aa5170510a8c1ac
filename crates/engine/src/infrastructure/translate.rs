//! Google Cloud Translation (v2 REST) client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::infrastructure::ports::{TranslateError, Translator};

/// Default API base URL.
pub const DEFAULT_TRANSLATE_BASE_URL: &str = "https://translation.googleapis.com";

/// Request timeout for translation calls.
pub const DEFAULT_TRANSLATE_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct GoogleTranslateClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleTranslateClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TRANSLATE_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Create client from environment variables.
    ///
    /// Uses `GOOGLE_TRANSLATE_API_KEY` and `GOOGLE_TRANSLATE_BASE_URL`. A
    /// missing key is not an error here: every call then fails and the caller
    /// falls back to its placeholder text.
    pub fn from_env() -> Self {
        let base_url = std::env::var("GOOGLE_TRANSLATE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_TRANSLATE_BASE_URL.to_string());
        let api_key = std::env::var("GOOGLE_TRANSLATE_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("GOOGLE_TRANSLATE_API_KEY is not set; translations will use fallbacks");
        }
        Self::new(&base_url, &api_key)
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        if self.api_key.is_empty() {
            return Err(TranslateError::RequestFailed(
                "GOOGLE_TRANSLATE_API_KEY is not set".to_string(),
            ));
        }

        let response = self
            .client
            .post(format!("{}/language/translate/v2", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&TranslateRequest {
                q: text,
                source,
                target,
                format: "text",
            })
            .send()
            .await
            .map_err(|e| TranslateError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| TranslateError::RequestFailed(e.to_string()))?;
            return Err(TranslateError::RequestFailed(error_text));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::InvalidResponse(e.to_string()))?;

        body.data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| TranslateError::InvalidResponse("no translations returned".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let client = GoogleTranslateClient::new("http://127.0.0.1:9", "");
        let err = client.translate("Health", "en", "fr").await.unwrap_err();
        assert!(matches!(err, TranslateError::RequestFailed(_)));
    }

    #[test]
    fn response_shape_parses() {
        let body: TranslateResponse = serde_json::from_str(
            r#"{"data":{"translations":[{"translatedText":"Santé"}]}}"#,
        )
        .unwrap();
        assert_eq!(body.data.translations[0].translated_text, "Santé");
    }
}
