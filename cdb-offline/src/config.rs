//! Agent configuration.
//!
//! Defaults match the production worker; an empty TOML document is valid.
//!
//! ```toml
//! cache_name = "cdb-pwa-v2"
//! offline_url = "/offline/"
//! default_title = "Coup de Bordure"
//! default_url = "/dashboard/"
//! prune_stale_caches = true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CACHE_NAME: &str = "cdb-pwa-v1";
pub const DEFAULT_OFFLINE_URL: &str = "/offline/";
pub const DEFAULT_TITLE: &str = "Coup de Bordure";
pub const DEFAULT_BODY: &str = "Notification";
pub const DEFAULT_ICON: &str = "/static/pwa/icon-192.png";
pub const DEFAULT_TARGET_URL: &str = "/dashboard/";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentConfig {
    /// Versioned cache bucket name (`<prefix>-vN`).
    pub cache_name: String,
    /// Key of the offline fallback document.
    pub offline_url: String,
    pub default_title: String,
    pub default_body: String,
    pub icon: String,
    pub badge: String,
    /// Opened when a notification carries no URL.
    pub default_url: String,
    /// Delete other generations of the cache on activate.
    pub prune_stale_caches: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            offline_url: DEFAULT_OFFLINE_URL.to_string(),
            default_title: DEFAULT_TITLE.to_string(),
            default_body: DEFAULT_BODY.to_string(),
            icon: DEFAULT_ICON.to_string(),
            badge: DEFAULT_ICON.to_string(),
            default_url: DEFAULT_TARGET_URL.to_string(),
            prune_stale_caches: false,
        }
    }
}

impl AgentConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if CacheGeneration::parse(&self.cache_name).is_none() {
            return Err(ConfigError::UnversionedCacheName {
                name: self.cache_name.clone(),
            });
        }
        for (field, url) in [
            ("offline_url", &self.offline_url),
            ("default_url", &self.default_url),
        ] {
            if !url.starts_with('/') {
                return Err(ConfigError::RelativeUrl {
                    field,
                    url: url.clone(),
                });
            }
        }
        if self.default_title.is_empty() {
            return Err(ConfigError::EmptyTitle);
        }
        Ok(())
    }

    pub fn generation(&self) -> Option<CacheGeneration> {
        CacheGeneration::parse(&self.cache_name)
    }
}

/// A versioned cache name split into prefix and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheGeneration {
    pub prefix: String,
    pub version: u32,
}

impl CacheGeneration {
    /// `"cdb-pwa-v3"` → prefix `"cdb-pwa"`, version 3.
    pub fn parse(name: &str) -> Option<Self> {
        let (prefix, version) = name.rsplit_once("-v")?;
        if prefix.is_empty() || version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            prefix: prefix.to_string(),
            version: version.parse().ok()?,
        })
    }

    /// Whether `name` is another generation of this cache.
    pub fn is_stale_sibling(&self, name: &str) -> bool {
        match Self::parse(name) {
            Some(other) => other.prefix == self.prefix && other.version != self.version,
            None => false,
        }
    }
}
