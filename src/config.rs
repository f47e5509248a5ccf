//! Configuration for gateguard.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listening port for the HTTP boundary.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Base URL of the trusted key source. The key set is fetched from
    /// `{key_source_url}/.well-known/keys.json` once at startup.
    #[serde(default)]
    pub key_source_url: String,

    /// Path of the replay ledger blob.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    /// Decision cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Decision cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of memoized decisions.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Time-to-live for a memoized decision, in seconds. Kept short so
    /// expiry, throughput, and ledger transitions are not masked for long.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            log_level: default_log_level(),
            key_source_url: String::new(),
            ledger_path: default_ledger_path(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

const fn default_port() -> u16 {
    1818
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("auth-ledger.mp")
}

const fn default_cache_capacity() -> usize {
    crate::cache::DEFAULT_CAPACITY
}

const fn default_cache_ttl_secs() -> u64 {
    crate::cache::DEFAULT_TTL.as_secs()
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &std::path::Path) -> crate::Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check startup invariants that serde defaults cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the key source URL is missing.
    pub fn validate(&self) -> crate::Result<()> {
        if self.key_source_url.is_empty() {
            return Err(crate::Error::Config(
                "key_source_url must be set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_constants() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 1818);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cache.capacity, 1024);
        assert_eq!(config.cache.ttl_secs, 10);
    }

    #[test]
    fn validate_requires_key_source() {
        let mut config = ServiceConfig::default();
        assert!(config.validate().is_err());

        config.key_source_url = "https://keys.example".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateguard.toml");

        let config = ServiceConfig {
            key_source_url: "https://keys.example".to_string(),
            port: 2020,
            ..ServiceConfig::default()
        };
        config.to_file(&path).unwrap();

        let loaded = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(loaded.port, 2020);
        assert_eq!(loaded.key_source_url, "https://keys.example");
        assert_eq!(loaded.cache.ttl_secs, 10);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ServiceConfig =
            toml::from_str("key_source_url = \"https://keys.example\"").unwrap();
        assert_eq!(config.port, 1818);
        assert_eq!(config.ledger_path, PathBuf::from("auth-ledger.mp"));
    }
}
