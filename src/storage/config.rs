use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::utils::get_env_with_prefix;

/// Store backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-memory store (default, state is lost on exit)
    #[default]
    Memory,
    /// One JSON file per key in a data directory
    File,
    /// No durable store in this context; reads return defaults, writes are skipped
    Unavailable,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Store backend type
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the file backend
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Load storage configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(backend) = get_env_with_prefix("STORAGE_BACKEND") {
            config.backend = match backend.to_lowercase().as_str() {
                "file" => StorageBackend::File,
                "unavailable" | "none" | "noop" => StorageBackend::Unavailable,
                "memory" => StorageBackend::Memory,
                other => {
                    tracing::warn!(
                        target: "leasekit::config",
                        backend = %other,
                        "Unknown storage backend, using memory"
                    );
                    StorageBackend::Memory
                }
            };
        }

        if let Some(dir) = get_env_with_prefix("DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_memory() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, StorageBackend::Memory);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_backend_deserializes_lowercase() {
        let config: StorageConfig =
            serde_json::from_str(r#"{"backend":"file","data_dir":"/var/lib/leasekit"}"#).unwrap();
        assert_eq!(config.backend, StorageBackend::File);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/leasekit")));
    }
}
