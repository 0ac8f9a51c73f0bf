//! Scripted host doubles for driving the agent in tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cdb_offline::{
    AgentConfig, CacheStorage, ClientHost, HostError, Network, NetworkError, NotificationHost,
    NotificationId, NotificationOptions, OfflineAgent, Request, Response,
};

pub const OFFLINE_PAGE: &str = "<!doctype html><h1>Hors ligne</h1>";

/// A network that serves fixed pages while online.
#[derive(Debug, Default)]
pub struct ScriptedNetwork {
    online: AtomicBool,
    pages: Mutex<BTreeMap<String, Response>>,
    pub requests: Mutex<Vec<String>>,
}

impl ScriptedNetwork {
    pub fn online() -> Self {
        let network = Self::default();
        network.set_online(true);
        network.serve(Response::html("/offline/", OFFLINE_PAGE));
        network
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn serve(&self, response: Response) {
        self.pages
            .lock()
            .unwrap()
            .insert(response.url.clone(), response);
    }

    pub fn forget(&self, url: &str) {
        self.pages.lock().unwrap().remove(url);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        self.requests.lock().unwrap().push(request.url.clone());
        if !self.online.load(Ordering::SeqCst) {
            return Err(NetworkError::Offline);
        }
        let page = self.pages.lock().unwrap().get(&request.url).cloned();
        Ok(page.unwrap_or_else(|| Response::new(404, request.url.as_str(), "not found")))
    }
}

/// Records every notification shown or closed.
#[derive(Debug, Default)]
pub struct RecordingNotifications {
    next_id: AtomicU64,
    pub denied: AtomicBool,
    pub shown: Mutex<Vec<(NotificationId, String, NotificationOptions)>>,
    pub closed: Mutex<Vec<NotificationId>>,
}

impl RecordingNotifications {
    pub fn shown(&self) -> Vec<(NotificationId, String, NotificationOptions)> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationHost for RecordingNotifications {
    async fn show_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<NotificationId, HostError> {
        if self.denied.load(Ordering::SeqCst) {
            return Err(HostError::PermissionDenied);
        }
        tokio::task::yield_now().await;
        let id = NotificationId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.shown
            .lock()
            .unwrap()
            .push((id, title.to_string(), options.clone()));
        Ok(id)
    }

    fn close_notification(&self, id: NotificationId) {
        self.closed.lock().unwrap().push(id);
    }
}

/// Records claims and opened windows.
#[derive(Debug, Default)]
pub struct RecordingClients {
    pub claims: AtomicUsize,
    pub fail_claim: AtomicBool,
    pub opened: Mutex<Vec<String>>,
}

impl RecordingClients {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClientHost for RecordingClients {
    async fn claim(&self) -> Result<(), HostError> {
        if self.fail_claim.load(Ordering::SeqCst) {
            return Err(HostError::Rejected("claim refused".to_string()));
        }
        self.claims.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<(), HostError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

pub type TestAgent = OfflineAgent<ScriptedNetwork, RecordingNotifications, RecordingClients>;

pub fn agent_with(config: AgentConfig, caches: Arc<CacheStorage>, network: ScriptedNetwork) -> TestAgent {
    OfflineAgent::new(
        config,
        caches,
        network,
        RecordingNotifications::default(),
        RecordingClients::default(),
    )
    .unwrap()
}

pub fn agent() -> TestAgent {
    agent_with(
        AgentConfig::default(),
        Arc::new(CacheStorage::new()),
        ScriptedNetwork::online(),
    )
}

/// An agent that has been installed and activated.
pub async fn active_agent() -> TestAgent {
    let agent = agent();
    agent.install().await.unwrap();
    agent.activate().await.unwrap();
    agent
}
