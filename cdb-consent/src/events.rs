//! Consent change events.
//!
//! Delivery is synchronous and in-process. An event emitted while nobody
//! is subscribed is dropped.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use spin::RwLock;

use crate::record::ConsentRecord;

/// Default name of the change event.
pub const CONSENT_EVENT: &str = "cdb:cookie-consent";

/// Payload of the change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsentEvent {
    pub analytics: bool,
    pub ads: bool,
}

impl From<&ConsentRecord> for ConsentEvent {
    fn from(record: &ConsentRecord) -> Self {
        Self {
            analytics: record.analytics(),
            ads: record.ads(),
        }
    }
}

/// Handle returned by [`ConsentEvents::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&ConsentEvent) + Send + Sync>;

/// Broadcaster for the named consent event.
pub struct ConsentEvents {
    name: String,
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
}

impl ConsentEvents {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_id: AtomicU64::new(1),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Event name listeners subscribe to.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscribe(&self, listener: impl Fn(&ConsentEvent) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Deliver `event` to every current listener, returning how many saw it.
    pub fn emit(&self, event: &ConsentEvent) -> usize {
        // Snapshot so listeners may (un)subscribe from inside a callback.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        log::debug!(
            "[CDB Consent] Dispatching {} to {} listener(s)",
            self.name,
            listeners.len()
        );
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }
}

impl Default for ConsentEvents {
    fn default() -> Self {
        Self::new(CONSENT_EVENT)
    }
}

impl fmt::Debug for ConsentEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsentEvents")
            .field("name", &self.name)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
