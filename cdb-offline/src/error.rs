//! Agent error types.

use crate::lifecycle::AgentState;

/// Transport-level failure of a network fetch.
///
/// A response with an error status is not a `NetworkError`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("network unreachable")]
    Offline,

    #[error("request aborted")]
    Aborted,

    #[error("network error: {0}")]
    Failed(String),
}

/// Cache API failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("fetching {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: NetworkError,
    },

    #[error("{url} answered {status}, refusing to cache")]
    BadStatus { url: String, status: u16 },

    #[error("only GET requests can be cached, got {method}")]
    InvalidRequest { method: &'static str },
}

/// A host capability refused or failed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("{0}")]
    Rejected(String),
}

/// Invalid agent configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Cache name {name:?} has no -vN version suffix")]
    UnversionedCacheName { name: String },

    #[error("{field} must be an absolute path, got {url:?}")]
    RelativeUrl { field: &'static str, url: String },

    #[error("Default notification title must not be empty")]
    EmptyTitle,
}

/// All errors produced by the agent.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("invalid state transition {from:?} -> {to:?}")]
    InvalidStateTransition { from: AgentState, to: AgentState },

    /// The offline page could not be cached; the install did not happen.
    #[error("install failed: {0}")]
    InstallFailed(#[source] CacheError),

    #[error("network failed and {url} is not cached")]
    OfflineFallbackMissing { url: String },

    #[error("notification display failed: {0}")]
    Notification(#[source] HostError),

    #[error("client operation failed: {0}")]
    Clients(#[source] HostError),

    #[error("{0}")]
    Config(#[from] ConfigError),
}
