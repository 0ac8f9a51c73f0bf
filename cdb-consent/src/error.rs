//! Error types for the consent store.

/// Failures of a durable key/value backend.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    /// Key + value would exceed the per-origin quota.
    #[error("QuotaExceededError: writing {key} would exceed {limit} bytes")]
    QuotaExceeded { key: String, limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Invalid consent configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Storage key must not be empty")]
    EmptyStorageKey,

    #[error("Invalid cookie name: {name:?}")]
    InvalidCookieName { name: String },

    #[error("Ads and analytics cookies share the name {name:?}")]
    DuplicateCookieName { name: String },

    #[error("Cookie path must start with '/': {path:?}")]
    InvalidCookiePath { path: String },

    #[error("Cookie expiry of {days} days is outside 1..={max}")]
    InvalidExpiry { days: u32, max: u32 },

    #[error("Event name must not be empty")]
    EmptyEventName,
}

/// All errors surfaced by [`ConsentStore`](crate::ConsentStore).
///
/// Reading never fails: a missing or corrupt record is reported as absent.
/// Only writes and resets can fail, and only because the backend refused.
#[derive(thiserror::Error, Debug)]
pub enum ConsentError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Config(#[from] ConfigError),
}
