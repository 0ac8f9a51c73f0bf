//! The offline agent: one dispatch table over the five triggers.

use std::sync::Arc;

use spin::RwLock;

use crate::cache::CacheStorage;
use crate::clients::ClientHost;
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::events::{
    ExtendableEvent, FetchDisposition, NotificationClickEvent, PushEvent, ResponseSource, Trigger,
    TriggerKind, TriggerOutcome,
};
use crate::fetch::{Network, Request};
use crate::lifecycle::{AgentState, Lifecycle};
use crate::notification::{NotificationHost, NotificationIntent, PushPayload};

/// A service-worker style agent for one cache generation.
///
/// Handlers take `&self`, so the host may run several triggers at once.
#[derive(Debug)]
pub struct OfflineAgent<N, H, C> {
    config: AgentConfig,
    caches: Arc<CacheStorage>,
    network: N,
    notifications: H,
    clients: C,
    lifecycle: RwLock<Lifecycle>,
}

impl<N, H, C> OfflineAgent<N, H, C>
where
    N: Network,
    H: NotificationHost,
    C: ClientHost,
{
    pub fn new(
        config: AgentConfig,
        caches: Arc<CacheStorage>,
        network: N,
        notifications: H,
        clients: C,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        Ok(Self {
            config,
            caches,
            network,
            notifications,
            clients,
            lifecycle: RwLock::new(Lifecycle::new()),
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn caches(&self) -> &Arc<CacheStorage> {
        &self.caches
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn notifications(&self) -> &H {
        &self.notifications
    }

    pub fn clients(&self) -> &C {
        &self.clients
    }

    pub fn state(&self) -> AgentState {
        self.lifecycle.read().state()
    }

    pub fn skip_waiting_requested(&self) -> bool {
        self.lifecycle.read().skip_waiting_requested()
    }

    /// Handle one trigger. The host must await the returned future before
    /// treating the trigger as handled.
    pub async fn dispatch(&self, trigger: Trigger) -> Result<TriggerOutcome, AgentError> {
        log::trace!("[CDB Agent] Dispatching {:?}", trigger.kind());
        match trigger {
            Trigger::Install => self.install().await.map(|()| TriggerOutcome::Installed),
            Trigger::Activate => self.activate().await.map(|()| TriggerOutcome::Activated),
            Trigger::Fetch(request) => self.fetch(&request).await.map(TriggerOutcome::Fetch),
            Trigger::Push(event) => self
                .push(&event)
                .await
                .map(TriggerOutcome::NotificationShown),
            Trigger::NotificationClick(event) => self
                .notification_click(&event)
                .await
                .map(TriggerOutcome::WindowOpened),
        }
    }

    /// Pre-cache the offline page and ask to skip waiting.
    ///
    /// If the page cannot be fetched the agent becomes redundant and the
    /// cache bucket is left empty.
    pub async fn install(&self) -> Result<(), AgentError> {
        self.lifecycle.write().transition(AgentState::Installing)?;

        let mut event = ExtendableEvent::new(TriggerKind::Install);
        event.wait_until(self.precache());
        self.lifecycle.write().skip_waiting();

        match event.settle().await {
            Ok(()) => {
                self.lifecycle.write().transition(AgentState::Installed)?;
                log::info!(
                    "[CDB Agent] Installed, {} cached in {}",
                    self.config.offline_url,
                    self.config.cache_name
                );
                Ok(())
            }
            Err(e) => {
                self.lifecycle.write().transition(AgentState::Redundant)?;
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<(), AgentError> {
        self.caches.open(&self.config.cache_name);
        self.caches
            .add_all(
                &self.config.cache_name,
                &self.network,
                &[Request::new(self.config.offline_url.as_str())],
            )
            .await
            .map_err(AgentError::InstallFailed)
    }

    /// Take control of open clients immediately.
    pub async fn activate(&self) -> Result<(), AgentError> {
        self.lifecycle.write().transition(AgentState::Activating)?;

        if self.config.prune_stale_caches {
            self.prune_stale_caches();
        }

        let mut event = ExtendableEvent::new(TriggerKind::Activate);
        event.wait_until(async { self.clients.claim().await.map_err(AgentError::Clients) });

        match event.settle().await {
            Ok(()) => {
                self.lifecycle.write().transition(AgentState::Activated)?;
                log::info!("[CDB Agent] Activated, clients claimed");
                Ok(())
            }
            Err(e) => {
                self.lifecycle.write().transition(AgentState::Redundant)?;
                Err(e)
            }
        }
    }

    /// Delete other generations of the configured cache.
    fn prune_stale_caches(&self) {
        let Some(current) = self.config.generation() else {
            return;
        };
        for name in self.caches.keys() {
            if current.is_stale_sibling(&name) && self.caches.delete(&name) {
                log::info!("[CDB Agent] Deleted stale cache {}", name);
            }
        }
    }

    /// Network-first for navigations, with the offline page as fallback.
    pub async fn fetch(&self, request: &Request) -> Result<FetchDisposition, AgentError> {
        if !request.is_navigation() {
            return Ok(FetchDisposition::Passthrough);
        }
        if !self.lifecycle.read().is_active() {
            log::debug!(
                "[CDB Agent] Not controlling yet, passing through {}",
                request.url
            );
            return Ok(FetchDisposition::Passthrough);
        }

        match self.network.fetch(request).await {
            Ok(response) => Ok(FetchDisposition::Respond {
                response,
                source: ResponseSource::Network,
            }),
            Err(e) => {
                log::warn!(
                    "[CDB Agent] Navigation to {} failed ({}), serving {}",
                    request.url,
                    e,
                    self.config.offline_url
                );
                let response = self
                    .caches
                    .match_in(&self.config.cache_name, &self.config.offline_url)
                    .ok_or_else(|| AgentError::OfflineFallbackMissing {
                        url: self.config.offline_url.clone(),
                    })?;
                Ok(FetchDisposition::Respond {
                    response,
                    source: ResponseSource::OfflineFallback,
                })
            }
        }
    }

    /// Display a notification for a push message.
    pub async fn push(&self, event: &PushEvent) -> Result<NotificationIntent, AgentError> {
        let payload = PushPayload::parse(event.data());
        let intent = NotificationIntent::from_payload(&payload, &self.config);

        let mut extendable = ExtendableEvent::new(TriggerKind::Push);
        extendable.wait_until(async {
            self.notifications
                .show_notification(&intent.title, &intent.options)
                .await
                .map(|id| log::debug!("[CDB Agent] Showing notification {:?}", id))
                .map_err(AgentError::Notification)
        });
        extendable.settle().await?;

        Ok(intent)
    }

    /// Close the clicked notification and open its target page.
    pub async fn notification_click(
        &self,
        event: &NotificationClickEvent,
    ) -> Result<String, AgentError> {
        self.notifications.close_notification(event.notification.id);

        let url = event
            .notification
            .url()
            .unwrap_or(self.config.default_url.as_str())
            .to_string();

        let mut extendable = ExtendableEvent::new(TriggerKind::NotificationClick);
        extendable.wait_until(async {
            self.clients
                .open_window(&url)
                .await
                .map_err(AgentError::Clients)
        });
        extendable.settle().await?;

        log::debug!("[CDB Agent] Opened {}", url);
        Ok(url)
    }
}
