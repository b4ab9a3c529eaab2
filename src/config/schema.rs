//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every field has a default so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root configuration for the API server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ApiConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backing data file.
    pub storage: StorageConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3333").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3333".to_string(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON document path. Relative paths resolve against the install directory.
    pub data_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("db.json"),
        }
    }
}

impl StorageConfig {
    /// Directory relative data files resolve against.
    pub fn install_dir() -> &'static Path {
        Path::new(env!("CARGO_MANIFEST_DIR"))
    }

    /// The data file as an absolute (or install-relative) path.
    pub fn resolved_path(&self) -> PathBuf {
        if self.data_file.is_absolute() {
            self.data_file.clone()
        } else {
            Self::install_dir().join(&self.data_file)
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: ApiConfig = toml::from_str("").unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:3333");
        assert_eq!(config.storage.data_file, PathBuf::from("db.json"));
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.limits.max_body_bytes, 1024 * 1024);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml() {
        let config: ApiConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:4000"

            [storage]
            data_file = "/var/lib/tasks/db.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
        assert_eq!(
            config.storage.resolved_path(),
            PathBuf::from("/var/lib/tasks/db.json")
        );
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_relative_data_file_resolves_against_install_dir() {
        let storage = StorageConfig::default();
        assert_eq!(
            storage.resolved_path(),
            StorageConfig::install_dir().join("db.json")
        );
    }
}
