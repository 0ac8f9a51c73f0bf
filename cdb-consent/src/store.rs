//! Consent Store
//!
//! Owns the durable record and its cookie mirror.
//!
//! - `get()` never fails; corrupt or missing state reads as undecided
//! - `write()` persists and mirrors, `notify()` announces; they are separate
//! - `reset()` forgets the decision and zeroes the mirror without announcing
//! - `initialize()` rewrites the mirror from an existing record

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::ConsentConfig;
use crate::cookies::{mirror_cookies, SideChannel};
use crate::error::ConsentError;
use crate::events::{ConsentEvent, ConsentEvents};
use crate::record::{ConsentDecision, ConsentRecord};
use crate::storage::DurableStore;

#[derive(Debug)]
pub struct ConsentStore<S, C> {
    config: ConsentConfig,
    storage: S,
    cookies: C,
    events: Arc<ConsentEvents>,
    clock: Arc<dyn Clock>,
}

impl<S: DurableStore, C: SideChannel> ConsentStore<S, C> {
    /// Create a store over `storage` and `cookies`.
    ///
    /// Fails only if `config` does not validate.
    pub fn new(config: ConsentConfig, storage: S, cookies: C) -> Result<Self, ConsentError> {
        config.validate()?;
        let events = Arc::new(ConsentEvents::new(config.event_name.clone()));
        Ok(Self {
            config,
            storage,
            cookies,
            events,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock used for record timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Share an existing event bus, e.g. one the application already listens on.
    pub fn with_events(mut self, events: Arc<ConsentEvents>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<ConsentEvents> {
        &self.events
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn cookies(&self) -> &C {
        &self.cookies
    }

    /// Page-load entry point.
    ///
    /// Returns the existing record, after rewriting its cookie mirror, or
    /// `None` when the user has not decided yet and should be prompted.
    pub fn initialize(&self) -> Option<ConsentRecord> {
        match self.get() {
            Some(record) => {
                log::debug!(
                    "[CDB Consent] Restoring mirror (analytics={}, ads={})",
                    record.analytics(),
                    record.ads()
                );
                self.mirror(record.analytics(), record.ads());
                Some(record)
            }
            None => {
                log::info!("[CDB Consent] No consent recorded, prompt required");
                None
            }
        }
    }

    /// Read the durable record.
    pub fn get(&self) -> Option<ConsentRecord> {
        let raw = self.storage.get_item(&self.config.storage_key)?;
        ConsentRecord::from_json(&raw)
    }

    /// Whether the user still has to make a decision.
    pub fn needs_prompt(&self) -> bool {
        self.get().is_none()
    }

    /// Persist a full record for `decision` and mirror it.
    ///
    /// Listeners are not notified; call [`notify`](Self::notify) or use
    /// [`commit`](Self::commit).
    pub fn write(&self, decision: ConsentDecision) -> Result<ConsentRecord, ConsentError> {
        let record = ConsentRecord::new(decision, self.clock.now_millis());
        let json = record.to_json()?;
        self.storage.set_item(&self.config.storage_key, &json)?;
        self.mirror(record.analytics(), record.ads());

        log::info!(
            "[CDB Consent] Recorded consent (analytics={}, ads={})",
            record.analytics(),
            record.ads()
        );
        Ok(record)
    }

    /// Broadcast `record` to listeners. Returns the number of listeners reached.
    pub fn notify(&self, record: &ConsentRecord) -> usize {
        self.events.emit(&ConsentEvent::from(record))
    }

    /// `write` followed by `notify`.
    pub fn commit(&self, decision: ConsentDecision) -> Result<ConsentRecord, ConsentError> {
        let record = self.write(decision)?;
        self.notify(&record);
        Ok(record)
    }

    /// Forget the decision and set both mirror cookies to `"false"`.
    pub fn reset(&self) -> Result<(), ConsentError> {
        self.storage.remove_item(&self.config.storage_key)?;
        self.mirror(false, false);
        log::info!("[CDB Consent] Consent reset");
        Ok(())
    }

    fn mirror(&self, analytics: bool, ads: bool) {
        for cookie in mirror_cookies(&self.config, analytics, ads) {
            self.cookies.set_cookie(&cookie);
        }
    }
}
