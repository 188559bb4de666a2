//! Cache store seam: named stores of request-keyed responses.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::http::{RequestKey, Response};

/// Handle to one opened store, addressed by its generation name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreHandle {
    name: String,
}

impl StoreHandle {
    /// Address an existing store without creating it. Writes through a handle
    /// to a missing store fail.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A stored, fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: RequestKey,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub stored_at: String,
}

impl CacheEntry {
    /// Snapshot `response` under `key`, stamped with the current time.
    pub fn capture(key: RequestKey, response: &Response) -> Self {
        Self {
            key,
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn to_response(&self) -> Response {
        Response { status: self.status, headers: self.headers.clone(), body: self.body.clone() }
    }
}

/// Persistent key-to-response storage.
///
/// Every failure is an I/O failure from the caller's point of view; callers
/// log it and treat the operation as a miss or a no-op.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the named store, creating it if absent.
    async fn open(&self, name: &str) -> Result<StoreHandle, Error>;

    /// Entry for `key`, or `None` on a miss.
    async fn get(&self, store: &StoreHandle, key: &RequestKey) -> Result<Option<CacheEntry>, Error>;

    /// Insert or overwrite one entry. Fails if the store no longer exists.
    async fn put(&self, store: &StoreHandle, entry: &CacheEntry) -> Result<(), Error>;

    /// Insert or overwrite a batch of entries atomically.
    async fn put_all(&self, store: &StoreHandle, entries: &[CacheEntry]) -> Result<(), Error>;

    /// Remove one entry. Returns whether it existed.
    async fn delete(&self, store: &StoreHandle, key: &RequestKey) -> Result<bool, Error>;

    /// Names of every existing store.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Remove a store with all of its entries. Returns whether it existed.
    async fn delete_store(&self, name: &str) -> Result<bool, Error>;

    /// Number of entries held by a store.
    async fn entry_count(&self, store: &StoreHandle) -> Result<u64, Error>;
}
