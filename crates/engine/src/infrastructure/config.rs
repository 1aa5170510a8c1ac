//! Tool configuration

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

pub const DEFAULT_ARANGO_URL: &str = "http://127.0.0.1:8529";
pub const DEFAULT_DATABASE: &str = "node-services";
/// The importer targets a scratch database unless told otherwise.
pub const DEFAULT_IMPORT_DATABASE: &str = "test-node-services";
pub const DEFAULT_EXPORT_DIR: &str = "./exports";
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// ArangoDB connection settings loaded from environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl ConnectionConfig {
    /// Load from `ARANGO_*` variables, falling back to `default_database`
    /// when `ARANGO_DATABASE` is unset.
    pub fn from_env(default_database: &str) -> Self {
        Self {
            url: env::var("ARANGO_URL").unwrap_or_else(|_| DEFAULT_ARANGO_URL.to_string()),
            database: env::var("ARANGO_DATABASE").unwrap_or_else(|_| default_database.to_string()),
            username: env::var("ARANGO_USERNAME")
                .or_else(|_| env::var("ARANGO_USER"))
                .unwrap_or_else(|_| "root".to_string()),
            password: env::var("ARANGO_PASSWORD").unwrap_or_default(),
        }
    }

    /// Replace the database when a command-line override is given.
    pub fn with_database(mut self, database: Option<String>) -> Self {
        if let Some(database) = database.filter(|d| !d.trim().is_empty()) {
            self.database = database;
        }
        self
    }
}

/// Hierarchy export settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub filename: String,
    /// Export whole documents instead of the clean projection.
    pub include_system_fields: bool,
    pub pretty_print: bool,
}

impl ExportConfig {
    pub fn from_env(now: DateTime<Utc>) -> Self {
        Self {
            output_dir: PathBuf::from(
                env::var("EXPORT_DIR").unwrap_or_else(|_| DEFAULT_EXPORT_DIR.to_string()),
            ),
            filename: env::var("EXPORT_FILENAME")
                .ok()
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| default_export_filename(now)),
            include_system_fields: env_flag("INCLUDE_SYSTEM_FIELDS", false),
            pretty_print: env_flag("PRETTY_PRINT", true),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.filename)
    }
}

/// `serviceCategoriesAndServices_export_2025-01-31T09-15-00.json`
pub fn default_export_filename(now: DateTime<Utc>) -> String {
    format!(
        "serviceCategoriesAndServices_export_{}.json",
        file_timestamp(now)
    )
}

/// Timestamp safe for file names: RFC 3339 seconds with `:` replaced.
pub fn file_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S").to_string()
}

/// Hierarchy import settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub file: PathBuf,
    pub create_database: bool,
    pub create_collections: bool,
    pub validate_before_import: bool,
    pub batch_size: usize,
    /// Strict cleanup keeps only allow-listed fields.
    pub strict: bool,
}

impl ImportConfig {
    /// Load from environment. `file` wins over `IMPORT_FILE`.
    pub fn from_env(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(
                env::var("IMPORT_FILE")
                    .context("an import file is required (argument or IMPORT_FILE)")?,
            ),
        };

        let batch_size: usize = match env::var("BATCH_SIZE") {
            Ok(raw) => raw
                .trim()
                .parse()
                .context("BATCH_SIZE must be a positive integer")?,
            Err(_) => DEFAULT_BATCH_SIZE,
        };
        anyhow::ensure!(batch_size > 0, "BATCH_SIZE must be a positive integer");

        Ok(Self {
            file,
            create_database: env_flag("CREATE_DATABASE", true),
            create_collections: env_flag("CREATE_COLLECTION", true),
            validate_before_import: env_flag("VALIDATE_BEFORE_IMPORT", true),
            batch_size,
            strict: env_flag("SCHEMA_STRICT", true),
        })
    }
}

/// `true`/`false` (any case) override `default`; anything else is ignored.
fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(raw) => parse_flag(&raw).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn flags_parse_common_spellings() {
        assert_eq!(parse_flag("FALSE"), Some(false));
        assert_eq!(parse_flag(" true "), Some(true));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn export_filename_uses_dashed_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 9, 15, 0).unwrap();
        assert_eq!(
            default_export_filename(now),
            "serviceCategoriesAndServices_export_2025-01-31T09-15-00.json"
        );
    }

    #[test]
    fn database_override_ignores_blank() {
        let config = ConnectionConfig {
            url: DEFAULT_ARANGO_URL.into(),
            database: DEFAULT_DATABASE.into(),
            username: "root".into(),
            password: String::new(),
        };
        assert_eq!(
            config.clone().with_database(Some("  ".into())).database,
            DEFAULT_DATABASE
        );
        assert_eq!(config.with_database(Some("other".into())).database, "other");
    }
}
