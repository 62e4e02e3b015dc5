//! Application configuration management.
//!
//! Sources, lowest precedence first: `config/default`, `config/{RUN_MODE}`,
//! then environment variables prefixed with `BAP` (`BAP__DATABASE__URL`).

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Document store configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Spreadsheet import tuning.
    #[serde(default)]
    pub import: ImportSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_access_token_minutes")]
    pub access_token_expires_minutes: i64,
}

fn default_access_token_minutes() -> i64 {
    480 // one working day
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_expires_minutes: default_access_token_minutes(),
        }
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Root directory holding the `pdf/` and `signed/` trees.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Largest document accepted, in bytes.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./data/documents")
}

fn default_max_document_bytes() -> u64 {
    20 * 1024 * 1024
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

/// Spreadsheet import configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportSettings {
    /// How many leading rows are scanned for the header.
    #[serde(default = "default_header_scan_rows")]
    pub header_scan_rows: usize,
    /// Fewest recognised columns for a row to count as the header.
    #[serde(default = "default_min_header_matches")]
    pub min_header_matches: usize,
    /// Largest spreadsheet accepted, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

fn default_header_scan_rows() -> usize {
    10
}

fn default_min_header_matches() -> usize {
    2
}

fn default_max_upload_bytes() -> u64 {
    50 * 1024 * 1024
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            header_scan_rows: default_header_scan_rows(),
            min_header_matches: default_min_header_matches(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BAP").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(source: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .and_then(config::Config::try_deserialize)
            .expect("config should deserialize")
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let cfg = from_toml(
            r#"
            [server]
            host = "127.0.0.1"
            [database]
            url = "sqlite::memory:"
            [jwt]
            secret = "s3cret"
            "#,
        );

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.jwt.access_token_expires_minutes, 480);
        assert_eq!(cfg.storage.root, PathBuf::from("./data/documents"));
        assert_eq!(cfg.import.header_scan_rows, 10);
        assert_eq!(cfg.import.min_header_matches, 2);
        assert_eq!(cfg.import.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_import_section_overrides() {
        let cfg = from_toml(
            r#"
            [server]
            port = 9000
            [database]
            url = "sqlite::memory:"
            [jwt]
            secret = "s3cret"
            [import]
            header_scan_rows = 25
            min_header_matches = 3
            [storage]
            root = "/srv/bap"
            "#,
        );

        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.import.header_scan_rows, 25);
        assert_eq!(cfg.import.min_header_matches, 3);
        assert_eq!(cfg.storage.root, PathBuf::from("/srv/bap"));
        assert_eq!(cfg.storage.max_document_bytes, 20 * 1024 * 1024);
    }
}
