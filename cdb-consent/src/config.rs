//! Consent store configuration.
//!
//! Every field has a default matching the production deployment, so an
//! empty TOML document is a valid configuration:
//!
//! ```toml
//! storage_key = "cdb_cookie_consent_v1"
//! ads_cookie = "cdb_ads"
//! analytics_cookie = "cdb_analytics"
//! cookie_path = "/"
//! cookie_max_age_days = 180
//! same_site = "lax"
//! event_name = "cdb:cookie-consent"
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::cookies::SameSite;
use crate::error::ConfigError;
use crate::events::CONSENT_EVENT;

/// Durable storage key holding the consent record.
pub const DEFAULT_STORAGE_KEY: &str = "cdb_cookie_consent_v1";
/// Cookie mirroring the ads flag.
pub const DEFAULT_ADS_COOKIE: &str = "cdb_ads";
/// Cookie mirroring the analytics flag.
pub const DEFAULT_ANALYTICS_COOKIE: &str = "cdb_analytics";
/// Lifetime of both mirror cookies.
pub const DEFAULT_COOKIE_MAX_AGE_DAYS: u32 = 180;
/// Longest cookie lifetime browsers honour.
pub const MAX_COOKIE_MAX_AGE_DAYS: u32 = 400;

/// Separators allowed in a cookie name besides ASCII alphanumerics.
const COOKIE_TOKEN_EXTRA: &str = "!#$%&'*+-.^_`|~";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsentConfig {
    /// Key of the durable record.
    pub storage_key: String,
    pub ads_cookie: String,
    pub analytics_cookie: String,
    /// Path scope of both cookies (`/` = whole origin).
    pub cookie_path: String,
    pub cookie_max_age_days: u32,
    pub same_site: SameSite,
    /// Name of the change event broadcast to listeners.
    pub event_name: String,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            ads_cookie: DEFAULT_ADS_COOKIE.to_string(),
            analytics_cookie: DEFAULT_ANALYTICS_COOKIE.to_string(),
            cookie_path: "/".to_string(),
            cookie_max_age_days: DEFAULT_COOKIE_MAX_AGE_DAYS,
            same_site: SameSite::Lax,
            event_name: CONSENT_EVENT.to_string(),
        }
    }
}

impl ConsentConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        for name in [&self.ads_cookie, &self.analytics_cookie] {
            if !is_cookie_token(name) {
                return Err(ConfigError::InvalidCookieName { name: name.clone() });
            }
        }
        if self.ads_cookie == self.analytics_cookie {
            return Err(ConfigError::DuplicateCookieName {
                name: self.ads_cookie.clone(),
            });
        }
        if !self.cookie_path.starts_with('/') {
            return Err(ConfigError::InvalidCookiePath {
                path: self.cookie_path.clone(),
            });
        }
        if self.cookie_max_age_days == 0 || self.cookie_max_age_days > MAX_COOKIE_MAX_AGE_DAYS {
            return Err(ConfigError::InvalidExpiry {
                days: self.cookie_max_age_days,
                max: MAX_COOKIE_MAX_AGE_DAYS,
            });
        }
        if self.event_name.is_empty() {
            return Err(ConfigError::EmptyEventName);
        }
        Ok(())
    }

    /// `Max-Age` of the mirror cookies.
    pub fn cookie_max_age(&self) -> Duration {
        Duration::days(i64::from(self.cookie_max_age_days))
    }
}

fn is_cookie_token(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || COOKIE_TOKEN_EXTRA.contains(c))
}
