//! Test doubles for the network, storage and platform seams.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use url::Url;

use crate::Error;
use crate::cache::{CacheDb, CacheEntry, CacheStorage, StoreHandle};
use crate::clients::Clients;
use crate::generation::Generation;
use crate::http::{Request, RequestKey, Response};
use crate::manifest::{AssetManifest, MatchMode};
use crate::network::Network;
use crate::notify::{Notification, NotificationSurface};

pub(crate) const ORIGIN: &str = "https://app.test";

/// Generation `offgrid-v{version}` over three assets at [`ORIGIN`].
pub(crate) fn generation(version: &str) -> Generation {
    let manifest = AssetManifest::new(vec!["/".into(), "/css/styles.css".into(), "/js/app.js".into()], MatchMode::Exact);
    Generation::new("offgrid", version, Url::parse(ORIGIN).unwrap(), "/api/", manifest)
}

pub(crate) fn get(path: &str) -> Request {
    Request::get(Url::parse(ORIGIN).unwrap().join(path).unwrap())
}

/// Path-keyed canned responses. Unknown paths answer 404.
#[derive(Default)]
pub(crate) struct MockNetwork {
    routes: Mutex<HashMap<String, (u16, String)>>,
    failing: Mutex<HashSet<String>>,
    offline: AtomicBool,
    stamp: AtomicBool,
    calls: AtomicUsize,
}

impl MockNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn serve(&self, path: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(path.to_string(), (status, body.to_string()));
    }

    /// Transport failure for one path.
    pub(crate) fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Append the call number to every body so responses are distinguishable.
    pub(crate) fn stamp_calls(&self) {
        self.stamp.store(true, Ordering::SeqCst);
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let path = request.url.path().to_string();

        let failing = self.failing.lock().unwrap().contains(&path);
        if self.offline.load(Ordering::SeqCst) || failing {
            return Err(Error::Network(format!("connection refused: {}", request.url)));
        }

        let route = self.routes.lock().unwrap().get(&path).cloned();
        let (status, mut body) = route.unwrap_or((404, "not found".to_string()));
        if self.stamp.load(Ordering::SeqCst) {
            body.push_str(&format!("#{call}"));
        }

        Ok(Response::new(status, vec![("content-type".into(), "text/plain".into())], body))
    }
}

#[derive(Default)]
pub(crate) struct RecordingClients {
    claims: Mutex<Vec<String>>,
    windows: Mutex<Vec<String>>,
    fail_claims: AtomicBool,
}

impl RecordingClients {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_claims(&self) {
        self.fail_claims.store(true, Ordering::SeqCst);
    }

    pub(crate) fn claims(&self) -> Vec<String> {
        self.claims.lock().unwrap().clone()
    }

    pub(crate) fn windows(&self) -> Vec<String> {
        self.windows.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clients for RecordingClients {
    async fn claim(&self, generation: &str) -> Result<usize, Error> {
        if self.fail_claims.load(Ordering::SeqCst) {
            return Err(Error::Notification("clients unavailable".into()));
        }
        self.claims.lock().unwrap().push(generation.to_string());
        Ok(1)
    }

    async fn open_window(&self, url: &str) -> Result<(), Error> {
        self.windows.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingSurface {
    shown: Mutex<Vec<Notification>>,
    closed: Mutex<Vec<String>>,
    fail_show: AtomicBool,
}

impl RecordingSurface {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_show(&self) {
        self.fail_show.store(true, Ordering::SeqCst);
    }

    pub(crate) fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }

    pub(crate) fn closed(&self) -> Vec<String> {
        self.closed.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSurface for RecordingSurface {
    async fn show(&self, notification: &Notification) -> Result<(), Error> {
        if self.fail_show.load(Ordering::SeqCst) {
            return Err(Error::Notification("permission denied".into()));
        }
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn close(&self, tag: &str) -> Result<bool, Error> {
        self.closed.lock().unwrap().push(tag.to_string());
        Ok(true)
    }
}

/// [`CacheDb`] with injectable read and delete failures.
pub(crate) struct FailingStorage {
    inner: CacheDb,
    fail_reads: AtomicBool,
    fail_deletes: Mutex<HashSet<String>>,
}

impl FailingStorage {
    pub(crate) fn new(inner: CacheDb) -> Self {
        Self { inner, fail_reads: AtomicBool::new(false), fail_deletes: Mutex::new(HashSet::new()) }
    }

    pub(crate) fn inner(&self) -> &CacheDb {
        &self.inner
    }

    pub(crate) fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_delete_of(&self, name: &str) {
        self.fail_deletes.lock().unwrap().insert(name.to_string());
    }

    fn injected(operation: &str) -> Error {
        tracing::debug!(operation, "injected storage failure");
        Error::Database(tokio_rusqlite::Error::Error(tokio_rusqlite::rusqlite::Error::InvalidQuery))
    }
}

#[async_trait]
impl CacheStorage for FailingStorage {
    async fn open(&self, name: &str) -> Result<StoreHandle, Error> {
        self.inner.open(name).await
    }

    async fn get(&self, store: &StoreHandle, key: &RequestKey) -> Result<Option<CacheEntry>, Error> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected("get"));
        }
        self.inner.get(store, key).await
    }

    async fn put(&self, store: &StoreHandle, entry: &CacheEntry) -> Result<(), Error> {
        self.inner.put(store, entry).await
    }

    async fn put_all(&self, store: &StoreHandle, entries: &[CacheEntry]) -> Result<(), Error> {
        self.inner.put_all(store, entries).await
    }

    async fn delete(&self, store: &StoreHandle, key: &RequestKey) -> Result<bool, Error> {
        self.inner.delete(store, key).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.inner.keys().await
    }

    async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let fail = self.fail_deletes.lock().unwrap().contains(name);
        if fail {
            return Err(Self::injected("delete_store"));
        }
        self.inner.delete_store(name).await
    }

    async fn entry_count(&self, store: &StoreHandle) -> Result<u64, Error> {
        self.inner.entry_count(store).await
    }
}
