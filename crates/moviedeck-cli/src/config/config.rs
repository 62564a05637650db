//! `AppConfig` struct and TOML loading.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding `catalog.api_key`.
pub const ENV_CATALOG_API_KEY: &str = "MOVIEDECK_CATALOG_API_KEY";

/// Environment variable overriding `watchlist.base_url`.
pub const ENV_WATCHLIST_URL: &str = "MOVIEDECK_WATCHLIST_URL";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Catalog API settings.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Watchlist backend settings.
    #[serde(default)]
    pub watchlist: WatchlistConfig,
    /// HTTP client settings shared by both services.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Catalog API configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogConfig {
    /// API key. Catalog reads fail with a configuration error without one.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the v3 API.
    #[serde(default = "default_catalog_url")]
    pub base_url: String,
}

/// Watchlist backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchlistConfig {
    /// Base URL used by every watchlist and auth call.
    #[serde(default = "default_watchlist_url")]
    pub base_url: String,
}

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_catalog_url() -> String {
    String::from(moviedeck_api::catalog::DEFAULT_BASE_URL)
}

fn default_watchlist_url() -> String {
    String::from(moviedeck_api::watchlist::DEFAULT_BASE_URL)
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_catalog_url(),
        }
    }
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            base_url: default_watchlist_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    /// Timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Applies environment overrides; blank values are ignored.
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = lookup(ENV_CATALOG_API_KEY) {
            self.catalog.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_WATCHLIST_URL) {
            self.watchlist.base_url = url;
        }
        self
    }

    /// Returns the catalog API key if one is configured.
    #[must_use]
    pub fn catalog_api_key(&self) -> Option<&str> {
        self.catalog
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert_eq!(config.catalog.api_key, None);
        assert_eq!(config.catalog.base_url, "https://api.themoviedb.org/3/");
        assert_eq!(config.watchlist.base_url, "http://localhost:5000/api/");
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_partial_config() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[catalog]\napi_key = \"abc\"\n\n[http]\ntimeout_secs = 3\n",
        )
        .unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.catalog_api_key(), Some("abc"));
        assert_eq!(config.catalog.base_url, "https://api.themoviedb.org/3/");
        assert_eq!(config.watchlist, WatchlistConfig::default());
        assert_eq!(config.http.timeout_secs, 3);
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[catalog\n").unwrap();

        // Act
        let result = AppConfig::load(&path);

        // Assert
        assert!(result.unwrap_err().to_string().contains("failed to parse"));
    }

    #[test]
    fn test_env_overrides_file_values() {
        // Arrange
        let env = HashMap::from([
            (ENV_CATALOG_API_KEY, "from-env"),
            (ENV_WATCHLIST_URL, "https://watchlist.example/api/"),
        ]);
        let mut config = AppConfig::default();
        config.catalog.api_key = Some(String::from("from-file"));

        // Act
        let config = config.with_env(|k| env.get(k).map(|v| String::from(*v)));

        // Assert
        assert_eq!(config.catalog_api_key(), Some("from-env"));
        assert_eq!(config.watchlist.base_url, "https://watchlist.example/api/");
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        // Arrange
        let mut config = AppConfig::default();
        config.catalog.api_key = Some(String::from("from-file"));

        // Act
        let config = config.with_env(|_| Some(String::from("  ")));

        // Assert
        assert_eq!(config.catalog_api_key(), Some("from-file"));
        assert_eq!(config.watchlist, WatchlistConfig::default());
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        // Arrange
        let mut config = AppConfig::default();
        config.catalog.api_key = Some(String::from(" "));

        // Act & Assert
        assert_eq!(config.catalog_api_key(), None);
    }
}
