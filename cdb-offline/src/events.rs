//! Agent Events
//!
//! The five triggers the host delivers, and the extend-lifetime contract:
//! work registered with [`ExtendableEvent::wait_until`] must settle before
//! the trigger counts as handled.

use std::fmt;
use std::future::Future;

use futures_util::future::{try_join_all, BoxFuture};
use futures_util::FutureExt;

use crate::error::AgentError;
use crate::fetch::Request;
use crate::notification::{DisplayedNotification, NotificationIntent};

/// Event type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    Install,
    Activate,
    Fetch,
    Push,
    NotificationClick,
}

/// Push event data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushEvent {
    data: Option<Vec<u8>>,
}

impl PushEvent {
    pub fn new(data: Option<Vec<u8>>) -> Self {
        Self { data }
    }

    /// Push without a payload.
    pub fn empty() -> Self {
        Self { data: None }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            data: Some(text.into().into_bytes()),
        }
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

/// Notification click event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationClickEvent {
    pub notification: DisplayedNotification,
}

impl NotificationClickEvent {
    pub fn new(notification: DisplayedNotification) -> Self {
        Self { notification }
    }
}

/// A trigger delivered by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Install,
    Activate,
    Fetch(Request),
    Push(PushEvent),
    NotificationClick(NotificationClickEvent),
}

impl Trigger {
    pub fn kind(&self) -> TriggerKind {
        match self {
            Trigger::Install => TriggerKind::Install,
            Trigger::Activate => TriggerKind::Activate,
            Trigger::Fetch(_) => TriggerKind::Fetch,
            Trigger::Push(_) => TriggerKind::Push,
            Trigger::NotificationClick(_) => TriggerKind::NotificationClick,
        }
    }
}

/// Where a fetch response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    /// The cached offline page.
    OfflineFallback,
}

/// What the agent did with a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDisposition {
    /// Not intercepted; the host performs its default fetch untouched.
    Passthrough,
    /// The agent answered the request.
    Respond {
        response: crate::fetch::Response,
        source: ResponseSource,
    },
}

/// Result of a handled trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    Installed,
    Activated,
    Fetch(FetchDisposition),
    NotificationShown(NotificationIntent),
    /// A browsing context was opened at this URL.
    WindowOpened(String),
}

/// Keeps a trigger alive until every registered future settles.
pub struct ExtendableEvent<'a> {
    kind: TriggerKind,
    pending: Vec<BoxFuture<'a, Result<(), AgentError>>>,
}

impl<'a> ExtendableEvent<'a> {
    pub fn new(kind: TriggerKind) -> Self {
        Self {
            kind,
            pending: Vec::new(),
        }
    }

    pub fn kind(&self) -> TriggerKind {
        self.kind
    }

    /// Extend the event's lifetime until `work` completes.
    pub fn wait_until(&mut self, work: impl Future<Output = Result<(), AgentError>> + Send + 'a) {
        self.pending.push(work.boxed());
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Await all registered work. The first failure fails the event.
    pub async fn settle(self) -> Result<(), AgentError> {
        let kind = self.kind;
        let count = self.pending.len();
        let result = try_join_all(self.pending).await.map(|_| ());
        match &result {
            Ok(()) => log::debug!("[CDB Agent] {:?} settled ({} task(s))", kind, count),
            Err(e) => log::warn!("[CDB Agent] {:?} failed: {}", kind, e),
        }
        result
    }
}

impl fmt::Debug for ExtendableEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendableEvent")
            .field("kind", &self.kind)
            .field("pending", &self.pending.len())
            .finish()
    }
}
