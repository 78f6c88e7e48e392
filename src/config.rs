//! Configuration module for filedrop.

use serde::Deserialize;
use std::path::Path;

use crate::{FiledropError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Storage directory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the directory uploads are written to and listed from.
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// Create the directory at startup if it is missing.
    #[serde(default = "default_create_dir")]
    pub create_dir: bool,
    /// Maximum request body size for uploads in megabytes (0 = unlimited).
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Reject client filenames containing path separators, NUL, `.` or `..`.
    ///
    /// Off by default: the client filename is used verbatim.
    #[serde(default)]
    pub reject_unsafe_filenames: bool,
}

fn default_storage_path() -> String {
    "/data".to_string()
}

fn default_create_dir() -> bool {
    true
}

fn default_max_upload_size() -> u64 {
    32
}

impl StorageConfig {
    /// Upload limit in bytes, or `None` when unlimited.
    pub fn max_upload_bytes(&self) -> Option<usize> {
        if self.max_upload_size_mb == 0 {
            return None;
        }
        usize::try_from(self.max_upload_size_mb.saturating_mul(1024 * 1024)).ok()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            create_dir: default_create_dir(),
            max_upload_size_mb: default_max_upload_size(),
            reject_unsafe_filenames: false,
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// Whether to serve static files for unmatched paths.
    #[serde(default = "default_static_enabled")]
    pub enabled: bool,
    /// Path to static files directory.
    #[serde(default = "default_static_path")]
    pub path: String,
}

fn default_static_enabled() -> bool {
    true
}

fn default_static_path() -> String {
    "static".to_string()
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: default_static_enabled(),
            path: default_static_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional path to a log file, written alongside stdout.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Static file configuration.
    #[serde(default)]
    pub static_files: StaticFilesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FiledropError::Config(format!("parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILEDROP_HOST`
    /// - `FILEDROP_PORT`
    /// - `FILEDROP_STORAGE_PATH`
    /// - `FILEDROP_STATIC_PATH`
    /// - `FILEDROP_LOG_LEVEL`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(host) = get("FILEDROP_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("FILEDROP_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                // Logging is not initialized yet at this point.
                Err(e) => eprintln!("Ignoring FILEDROP_PORT={port}: {e}"),
            }
        }
        if let Some(path) = get("FILEDROP_STORAGE_PATH") {
            self.storage.path = path;
        }
        if let Some(path) = get("FILEDROP_STATIC_PATH") {
            self.static_files.path = path;
        }
        if let Some(level) = get("FILEDROP_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The storage path is empty
    /// - Static serving is enabled but no static path is set
    pub fn validate(&self) -> Result<()> {
        if self.storage.path.trim().is_empty() {
            return Err(FiledropError::Config(
                "storage.path must not be empty".to_string(),
            ));
        }
        if self.static_files.enabled && self.static_files.path.trim().is_empty() {
            return Err(FiledropError::Config(
                "static_files.enabled is set but static_files.path is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);

        assert_eq!(config.storage.path, "/data");
        assert!(config.storage.create_dir);
        assert_eq!(config.storage.max_upload_size_mb, 32);
        assert!(!config.storage.reject_unsafe_filenames);

        assert!(config.static_files.enabled);
        assert_eq!(config.static_files.path, "static");

        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.path, "/data");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[storage]
path = "uploads"
create_dir = false
max_upload_size_mb = 0
reject_unsafe_filenames = true

[static_files]
enabled = false
path = "public"

[logging]
level = "debug"
file = "logs/filedrop.log"
"#;
        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.path, "uploads");
        assert!(!config.storage.create_dir);
        assert_eq!(config.storage.max_upload_size_mb, 0);
        assert!(config.storage.reject_unsafe_filenames);
        assert!(!config.static_files.enabled);
        assert_eq!(config.static_files.path, "public");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file.as_deref(), Some("logs/filedrop.log"));
    }

    #[test]
    fn test_parse_partial_section() {
        let config = Config::parse("[server]\nport = 3000\n").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_parse_invalid() {
        let result = Config::parse("[server]\nport = \"not a number\"\n");
        assert!(matches!(result, Err(FiledropError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\npath = \"/srv/drop\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.storage.path, "/srv/drop");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/filedrop/config.toml");
        assert!(matches!(result, Err(FiledropError::Io(_))));
    }

    #[test]
    fn test_max_upload_bytes() {
        let mut storage = StorageConfig::default();
        assert_eq!(storage.max_upload_bytes(), Some(32 * 1024 * 1024));

        storage.max_upload_size_mb = 0;
        assert_eq!(storage.max_upload_bytes(), None);
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FILEDROP_HOST", "127.0.0.1"),
            ("FILEDROP_PORT", "9999"),
            ("FILEDROP_STORAGE_PATH", "/tmp/drop"),
            ("FILEDROP_STATIC_PATH", "web"),
            ("FILEDROP_LOG_LEVEL", "warn"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.storage.path, "/tmp/drop");
        assert_eq!(config.static_files.path, "web");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_apply_overrides_ignores_empty_and_invalid() {
        let vars: HashMap<&str, &str> = [("FILEDROP_HOST", ""), ("FILEDROP_PORT", "http")]
            .into_iter()
            .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.storage.path = "  ".to_string();
        assert!(matches!(config.validate(), Err(FiledropError::Config(_))));

        let mut config = Config::default();
        config.static_files.path = String::new();
        assert!(config.validate().is_err());

        config.static_files.enabled = false;
        assert!(config.validate().is_ok());
    }
}
