//! # Storefront Configuration
//!
//! Configuration for the synchronization layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_API_URL=https://shop.example.com                        │
//! │     STOREFRONT_FALLBACK_PATH=/srv/catalog.json                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/client/storefront.toml (Linux)                           │
//! │     ~/Library/Application Support/com.storefront.client/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8080 + /api/products                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [api]
//! base_url = "http://localhost:8080"
//! products_path = "/api/products"
//! timeout_secs = 10
//! connect_timeout_secs = 5
//!
//! [catalog]
//! fallback_path = "/srv/storefront/products.json"  # optional
//!
//! [images]
//! leak_warning_threshold = 256
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// API Settings
// =============================================================================

/// Where and how to reach the product backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Scheme, host and port of the backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the products resource, joined onto `base_url`.
    #[serde(default = "default_products_path")]
    pub products_path: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// TCP/TLS connect timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_products_path() -> String {
    "/api/products".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            products_path: default_products_path(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl ApiSettings {
    /// Full URL of the products resource.
    pub fn products_url(&self) -> SyncResult<Url> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(&self.products_path)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

// =============================================================================
// Catalog Settings
// =============================================================================

/// Catalog store behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Dataset used instead of the bundled one when the backend is down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_path: Option<PathBuf>,
}

// =============================================================================
// Image Settings
// =============================================================================

/// Image handle accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSettings {
    /// Live handle count above which a leak warning is logged.
    #[serde(default = "default_leak_warning_threshold")]
    pub leak_warning_threshold: usize,
}

fn default_leak_warning_threshold() -> usize {
    256
}

impl Default for ImageSettings {
    fn default() -> Self {
        ImageSettings {
            leak_warning_threshold: default_leak_warning_threshold(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub images: ImageSettings,
}

impl StorefrontConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load storefront config, using defaults");
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        let base = Url::parse(&self.api.base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(SyncError::InvalidUrl(format!(
                "Base URL must use http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if !self.api.products_path.starts_with('/') {
            return Err(SyncError::InvalidConfig(format!(
                "products_path must start with '/', got: {}",
                self.api.products_path
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("STOREFRONT_API_URL") {
            debug!(url = %url, "Overriding API base URL from environment");
            self.api.base_url = url;
        }

        if let Ok(path) = std::env::var("STOREFRONT_PRODUCTS_PATH") {
            self.api.products_path = path;
        }

        if let Ok(timeout) = std::env::var("STOREFRONT_API_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric STOREFRONT_API_TIMEOUT_SECS"),
            }
        }

        if let Ok(path) = std::env::var("STOREFRONT_FALLBACK_PATH") {
            debug!(path = %path, "Overriding fallback dataset from environment");
            self.catalog.fallback_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "client")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }
}
