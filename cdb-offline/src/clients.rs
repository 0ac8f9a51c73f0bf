//! Client contexts (open tabs and windows) controlled by the agent.

use async_trait::async_trait;

use crate::error::HostError;

/// The host's view of the agent's clients.
#[async_trait]
pub trait ClientHost: Send + Sync {
    /// Take control of every open client in scope without a reload.
    async fn claim(&self) -> Result<(), HostError>;

    /// Open a browsing context at `url`. Hosts may focus an existing one.
    async fn open_window(&self, url: &str) -> Result<(), HostError>;
}
