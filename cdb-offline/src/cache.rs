//! Cache API Implementation
//!
//! Named request/response buckets shared between the agent's handlers.
//! Only `GET` responses are stored. Locks are never held across an await:
//! `add_all` fetches everything first and commits in one step, so a failed
//! fetch leaves the bucket untouched.

use std::collections::BTreeMap;

use spin::RwLock;

use crate::error::CacheError;
use crate::fetch::{Network, Request, RequestMethod, Response};

/// A cached request-response pair
#[derive(Debug, Clone)]
struct CacheEntry {
    request: Request,
    response: Response,
}

/// A single named cache
#[derive(Debug, Clone, Default)]
pub struct Cache {
    /// Cached entries (URL -> entry)
    entries: BTreeMap<String, CacheEntry>,
}

impl Cache {
    /// Exact URL match
    pub fn match_url(&self, url: &str) -> Option<Response> {
        self.entries.get(url).map(|e| e.response.clone())
    }

    /// Add a request/response pair to cache
    pub fn put(&mut self, request: Request, response: Response) -> Result<(), CacheError> {
        if request.method != RequestMethod::Get {
            return Err(CacheError::InvalidRequest {
                method: request.method.as_str(),
            });
        }
        self.entries
            .insert(request.url.clone(), CacheEntry { request, response });
        Ok(())
    }

    /// Cached request URLs
    pub fn keys(&self) -> Vec<String> {
        self.entries.values().map(|e| e.request.url.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Named caches for one origin
#[derive(Debug, Default)]
pub struct CacheStorage {
    /// Caches by name
    caches: RwLock<BTreeMap<String, Cache>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open or create a cache. Returns `true` if it was created.
    pub fn open(&self, name: &str) -> bool {
        let mut caches = self.caches.write();
        if caches.contains_key(name) {
            return false;
        }
        caches.insert(name.to_string(), Cache::default());
        true
    }

    /// Delete a cache
    pub fn delete(&self, name: &str) -> bool {
        self.caches.write().remove(name).is_some()
    }

    /// Get all cache names
    pub fn keys(&self) -> Vec<String> {
        self.caches.read().keys().cloned().collect()
    }

    /// Snapshot of one cache.
    pub fn cache(&self, name: &str) -> Option<Cache> {
        self.caches.read().get(name).cloned()
    }

    /// Match in one named cache only.
    pub fn match_in(&self, name: &str, url: &str) -> Option<Response> {
        self.caches
            .read()
            .get(name)
            .and_then(|c| c.match_url(url))
    }

    /// Fetch every request and store all responses, or store nothing.
    ///
    /// Any transport failure or non-2xx status rejects the whole batch.
    pub async fn add_all(
        &self,
        name: &str,
        network: &dyn Network,
        requests: &[Request],
    ) -> Result<(), CacheError> {
        let mut fetched = Vec::with_capacity(requests.len());
        for request in requests {
            if request.method != RequestMethod::Get {
                return Err(CacheError::InvalidRequest {
                    method: request.method.as_str(),
                });
            }
            let response = network
                .fetch(request)
                .await
                .map_err(|source| CacheError::Fetch {
                    url: request.url.clone(),
                    source,
                })?;
            if !response.ok() {
                return Err(CacheError::BadStatus {
                    url: request.url.clone(),
                    status: response.status,
                });
            }
            fetched.push((request.clone(), response));
        }

        let mut caches = self.caches.write();
        let cache = caches.entry(name.to_string()).or_default();
        for (request, response) in fetched {
            cache.put(request, response)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use async_trait::async_trait;

    struct Origin;

    #[async_trait]
    impl Network for Origin {
        async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
            match request.url.as_str() {
                "/down/" => Err(NetworkError::Offline),
                "/missing/" => Ok(Response::new(404, &request.url, "not found")),
                url => Ok(Response::html(url, format!("page {url}"))),
            }
        }
    }

    #[test]
    fn open_is_idempotent() {
        let storage = CacheStorage::new();
        assert!(storage.open("v1"));
        assert!(!storage.open("v1"));
        assert_eq!(storage.keys(), vec!["v1".to_string()]);
        assert!(storage.delete("v1"));
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn put_rejects_non_get() {
        let mut cache = Cache::default();
        let result = cache.put(
            Request::new("/api/bets").with_method(RequestMethod::Post),
            Response::new(200, "/api/bets", ""),
        );
        assert_eq!(result, Err(CacheError::InvalidRequest { method: "POST" }));
        assert!(cache.is_empty());
    }

    #[test]
    fn put_overwrites_same_url() {
        let mut cache = Cache::default();
        cache.put(Request::new("/a"), Response::new(200, "/a", "12345")).unwrap();
        cache.put(Request::new("/a"), Response::new(200, "/a", "12")).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.match_url("/a").unwrap().body, b"12".to_vec());
        assert!(cache.match_url("/a?v=2").is_none());
    }

    #[tokio::test]
    async fn match_in_reads_only_the_named_cache() {
        let storage = CacheStorage::new();
        storage
            .add_all("v1", &Origin, &[Request::new("/offline/")])
            .await
            .unwrap();
        assert_eq!(
            storage.match_in("v1", "/offline/").unwrap().body,
            b"page /offline/".to_vec()
        );
        assert!(storage.match_in("v2", "/offline/").is_none());
    }

    #[tokio::test]
    async fn add_all_commits_everything() {
        let storage = CacheStorage::new();
        storage
            .add_all("v1", &Origin, &[Request::new("/offline/"), Request::new("/")])
            .await
            .unwrap();
        let cache = storage.cache("v1").unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn add_all_is_all_or_nothing() {
        let storage = CacheStorage::new();
        storage.open("v1");

        let err = storage
            .add_all("v1", &Origin, &[Request::new("/offline/"), Request::new("/down/")])
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Fetch { .. }));
        assert!(storage.cache("v1").unwrap().is_empty());

        let err = storage
            .add_all("v1", &Origin, &[Request::new("/missing/")])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CacheError::BadStatus {
                url: "/missing/".to_string(),
                status: 404
            }
        );
        assert!(storage.cache("v1").unwrap().is_empty());
    }
}
