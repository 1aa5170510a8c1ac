//! REST plumbing shared by the store implementations.

use reqwest::{Client, RequestBuilder, Url};
use serde_json::{json, Value};
use std::time::Duration;

use crate::infrastructure::config::ConnectionConfig;
use crate::infrastructure::ports::StoreError;

/// Request timeout for store calls.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 60;

/// Rows fetched per cursor round trip.
const CURSOR_BATCH_SIZE: usize = 1000;

#[derive(Clone)]
pub struct ArangoClient {
    client: Client,
    base_url: String,
    database: String,
    username: String,
    password: String,
}

impl ArangoClient {
    pub fn new(config: &ConnectionConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Check connectivity and credentials. Returns the server version.
    pub async fn ping(&self) -> Result<String, StoreError> {
        let body = self
            .send("server version", self.client.get(self.system_url("/_api/version")))
            .await?;
        Ok(body
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string())
    }

    pub(super) fn db_url(&self, path: &str) -> String {
        format!("{}/_db/{}{}", self.base_url, self.database, path)
    }

    pub(super) fn system_url(&self, path: &str) -> String {
        format!("{}/_db/_system{}", self.base_url, path)
    }

    /// Database-scoped URL from raw path segments. Each segment is
    /// percent-encoded, so names and keys may contain `/`, `?`, `#` or spaces.
    pub(super) fn db_segments_url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| StoreError::request("build url", e))?;
        url.path_segments_mut()
            .map_err(|()| {
                StoreError::request("build url", format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(["_db", self.database.as_str()])
            .extend(segments);
        Ok(url)
    }

    pub(super) fn get_at(&self, segments: &[&str]) -> Result<RequestBuilder, StoreError> {
        Ok(self.client.get(self.db_segments_url(segments)?))
    }

    pub(super) fn post_at(&self, segments: &[&str]) -> Result<RequestBuilder, StoreError> {
        Ok(self.client.post(self.db_segments_url(segments)?))
    }

    pub(super) fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.db_url(path))
    }

    pub(super) fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.db_url(path))
    }

    pub(super) fn system_get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.system_url(path))
    }

    pub(super) fn system_post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.system_url(path))
    }

    /// Send with credentials and decode the JSON body. Non-2xx responses
    /// become [`StoreError::Api`] carrying the server's `errorNum`.
    pub(super) async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Value, StoreError> {
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| StoreError::request(operation, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::request(operation, e))?;

        if !status.is_success() {
            let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
            let error_num = body.get("errorNum").and_then(Value::as_u64);
            let message = body
                .get("errorMessage")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(text);
            return Err(StoreError::api(operation, status.as_u16(), error_num, message));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| StoreError::serialization(format!("{operation}: {e}")))
    }

    /// Run an AQL query and drain its cursor.
    pub async fn query(&self, aql: &str, bind_vars: Value) -> Result<Vec<Value>, StoreError> {
        let mut body = self
            .send(
                "query",
                self.post("/_api/cursor").json(&json!({
                    "query": aql,
                    "bindVars": bind_vars,
                    "batchSize": CURSOR_BATCH_SIZE,
                })),
            )
            .await?;

        let mut rows = Vec::new();
        loop {
            if let Some(Value::Array(batch)) = body.get_mut("result").map(Value::take) {
                rows.extend(batch);
            }
            let has_more = body.get("hasMore").and_then(Value::as_bool).unwrap_or(false);
            let cursor_id = body.get("id").and_then(Value::as_str).map(str::to_string);
            match (has_more, cursor_id) {
                (true, Some(id)) => {
                    body = self
                        .send(
                            "query (next batch)",
                            self.client.put(self.db_url(&format!("/_api/cursor/{id}"))),
                        )
                        .await?;
                }
                _ => break,
            }
        }
        Ok(rows)
    }
}

/// Extract an array field, treating absence as empty.
pub(super) fn array_field(body: &mut Value, field: &str) -> Vec<Value> {
    match body.get_mut(field).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}
