//! Push Notifications
//!
//! Turns push payloads into displayable notifications. Every field of the
//! payload is optional and defaults independently, so an empty or broken
//! payload still produces a notification.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AgentConfig;
use crate::error::HostError;

// ── Payload ─────────────────────────────────────────────────

/// Fields read from a push payload `{"title":..,"body":..,"url":..}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
}

impl PushPayload {
    /// Parse raw push data.
    ///
    /// Missing data, invalid JSON and non-object JSON all yield the empty
    /// payload. Fields that are not non-empty strings are dropped.
    pub fn parse(data: Option<&[u8]>) -> Self {
        let Some(bytes) = data.filter(|b| !b.is_empty()) else {
            return Self::default();
        };
        let value: Value = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("[CDB Agent] Push payload is not JSON, using defaults: {}", e);
                return Self::default();
            }
        };
        let Value::Object(fields) = value else {
            log::warn!("[CDB Agent] Push payload is not an object, using defaults");
            return Self::default();
        };

        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            title: text("title"),
            body: text("body"),
            url: text("url"),
        }
    }
}

// ── Notification ────────────────────────────────────────────

/// Opaque data attached to a displayed notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub url: String,
}

/// Options passed along with the title when displaying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub data: NotificationData,
}

/// A notification about to be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationIntent {
    pub title: String,
    pub options: NotificationOptions,
}

impl NotificationIntent {
    /// Fill every missing payload field from `config`.
    pub fn from_payload(payload: &PushPayload, config: &AgentConfig) -> Self {
        Self {
            title: payload
                .title
                .clone()
                .unwrap_or_else(|| config.default_title.clone()),
            options: NotificationOptions {
                body: payload
                    .body
                    .clone()
                    .unwrap_or_else(|| config.default_body.clone()),
                icon: config.icon.clone(),
                badge: config.badge.clone(),
                data: NotificationData {
                    url: payload
                        .url
                        .clone()
                        .unwrap_or_else(|| config.default_url.clone()),
                },
            },
        }
    }

    /// Page opened when the notification is clicked.
    pub fn target_url(&self) -> &str {
        &self.options.data.url
    }
}

/// Host-assigned notification handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub u64);

/// A notification as the host reports it back on click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedNotification {
    pub id: NotificationId,
    pub title: String,
    /// May be missing if the host dropped it.
    pub data: Option<NotificationData>,
}

impl DisplayedNotification {
    /// The attached URL, if present and non-empty.
    pub fn url(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.url.as_str())
            .filter(|url| !url.is_empty())
    }
}

/// The host's notification surface.
#[async_trait]
pub trait NotificationHost: Send + Sync {
    /// Display a notification; resolves once it is shown.
    async fn show_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<NotificationId, HostError>;

    /// Dismiss a displayed notification.
    fn close_notification(&self, id: NotificationId);
}

// ── Tests ───────────────────────────────────────────────────
