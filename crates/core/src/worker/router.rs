//! Per-request routing policy.
//!
//! | class    | strategy                                          |
//! |----------|---------------------------------------------------|
//! | `api`    | network only, offline JSON on failure, never cached |
//! | `static` | cache first, populate the store on a miss         |
//! | `other`  | network first, store 200s, fall back to the store |
//!
//! Non-GET requests pass through untouched. The router never creates a
//! store: it addresses the generation's store by name, so a write racing an
//! eviction fails instead of resurrecting the evicted store.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::writeback::{PendingWrite, Writeback};
use crate::cache::{CacheEntry, CacheStorage, StoreHandle};
use crate::generation::{Generation, RequestClass};
use crate::http::{Request, RequestKey, Response};
use crate::network::Network;

/// Body error message of the synthesized offline API response.
pub const OFFLINE_ERROR: &str = "Offline";

/// Where a produced response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Network,
    Cache,
    /// Synthesized offline payload for API traffic.
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not intercepted; the host performs the request itself.
    PassThrough,
    Respond { response: Response, source: ResponseSource },
    /// Neither the network nor the store produced a response.
    NetworkError(String),
}

/// Routing result plus the background store write it started, if any.
#[derive(Debug)]
pub struct Routed {
    pub class: Option<RequestClass>,
    pub outcome: Outcome,
    pub write: Option<PendingWrite>,
}

impl Routed {
    pub fn pass_through() -> Self {
        Self { class: None, outcome: Outcome::PassThrough, write: None }
    }

    fn respond(class: RequestClass, response: Response, source: ResponseSource) -> Self {
        Self { class: Some(class), outcome: Outcome::Respond { response, source }, write: None }
    }

    fn with_write(mut self, write: Option<PendingWrite>) -> Self {
        self.write = write;
        self
    }
}

/// The synthesized response for API requests made while offline.
pub fn offline_response() -> Response {
    Response::json(200, &serde_json::json!({ "error": OFFLINE_ERROR }))
}

pub struct Router<S: ?Sized, N: ?Sized> {
    storage: Arc<S>,
    network: Arc<N>,
    writeback: Writeback,
}

impl<S, N> Router<S, N>
where
    S: CacheStorage + ?Sized + 'static,
    N: Network + ?Sized,
{
    pub fn new(storage: Arc<S>, network: Arc<N>, writeback: Writeback) -> Self {
        Self { storage, network, writeback }
    }

    /// Route one intercepted request under `generation`.
    pub async fn route(&self, generation: &Generation, request: &Request) -> Routed {
        if !request.is_get() {
            tracing::trace!(method = %request.method, url = %request.url, "passing through non-GET request");
            return Routed::pass_through();
        }

        let class = generation.classify(request);
        tracing::debug!(class = %class, url = %request.url, generation = generation.name(), "routing request");

        match class {
            RequestClass::Api => self.network_only(request).await,
            RequestClass::Static => self.cache_first(generation, request).await,
            RequestClass::Other => self.network_first(generation, request).await,
        }
    }

    async fn network_only(&self, request: &Request) -> Routed {
        match self.network.fetch(request).await {
            Ok(response) => Routed::respond(RequestClass::Api, response, ResponseSource::Network),
            Err(e) => {
                tracing::info!(url = %request.url, error = %e, "api request failed, serving offline payload");
                Routed::respond(RequestClass::Api, offline_response(), ResponseSource::Offline)
            }
        }
    }

    async fn cache_first(&self, generation: &Generation, request: &Request) -> Routed {
        let store = StoreHandle::new(generation.name());
        let key = request.key();

        if let Some(entry) = self.lookup(&store, &key).await {
            return Routed::respond(RequestClass::Static, entry.to_response(), ResponseSource::Cache);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                let write = self.commit(store, key, &response);
                Routed::respond(RequestClass::Static, response, ResponseSource::Network).with_write(write)
            }
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "static asset missing from cache and network");
                Routed { class: Some(RequestClass::Static), outcome: Outcome::NetworkError(e.to_string()), write: None }
            }
        }
    }

    async fn network_first(&self, generation: &Generation, request: &Request) -> Routed {
        let store = StoreHandle::new(generation.name());
        let key = request.key();

        match self.network.fetch(request).await {
            Ok(response) => {
                let write = self.commit(store, key, &response);
                Routed::respond(RequestClass::Other, response, ResponseSource::Network).with_write(write)
            }
            Err(e) => match self.lookup(&store, &key).await {
                Some(entry) => {
                    tracing::info!(url = %request.url, error = %e, "network failed, serving cached response");
                    Routed::respond(RequestClass::Other, entry.to_response(), ResponseSource::Cache)
                }
                None => {
                    tracing::info!(url = %request.url, error = %e, "network failed and nothing cached");
                    Routed { class: Some(RequestClass::Other), outcome: Outcome::NetworkError(e.to_string()), write: None }
                }
            },
        }
    }

    /// Store read; a failing store counts as a miss.
    async fn lookup(&self, store: &StoreHandle, key: &RequestKey) -> Option<CacheEntry> {
        match self.storage.get(store, key).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(store = store.name(), url = %key.url, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Start a background write for a 200 response.
    fn commit(&self, store: StoreHandle, key: RequestKey, response: &Response) -> Option<PendingWrite> {
        if response.status != 200 {
            return None;
        }
        let entry = CacheEntry::capture(key, response);
        Some(self.writeback.spawn(self.storage.clone(), store, entry))
    }
}
