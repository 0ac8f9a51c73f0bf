//! Offline Agent
//!
//! A service-worker style background agent for the CDB web app:
//! pre-caches the offline page on install, claims open clients on
//! activate, serves the offline page when a navigation cannot reach the
//! network, and turns push messages into notifications that open a page
//! when clicked.
//!
//! The host runtime drives the agent through [`OfflineAgent::dispatch`]
//! and must await each returned future before treating the trigger as
//! handled.

mod agent;
mod cache;
mod clients;
mod config;
mod error;
mod events;
mod fetch;
mod lifecycle;
mod notification;

pub use agent::*;
pub use cache::*;
pub use clients::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use fetch::*;
pub use lifecycle::*;
pub use notification::*;
