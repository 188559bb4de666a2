//! Fire-and-forget cache writes.
//!
//! The router hands a captured entry to [`Writeback::spawn`] and returns the
//! live response immediately. The write runs as its own task; a failure is
//! logged and sent on the failure channel, never back to the request path.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cache::{CacheEntry, CacheStorage, StoreHandle};

/// A background write that did not land.
#[derive(Debug, Clone)]
pub struct WriteFailure {
    pub store: String,
    pub url: String,
    pub message: String,
}

/// Handle to a spawned write. Dropping it detaches the task.
#[derive(Debug)]
pub struct PendingWrite {
    handle: JoinHandle<()>,
}

impl PendingWrite {
    /// Wait until the write has committed or failed.
    pub async fn settled(self) {
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "background cache write task aborted");
        }
    }
}

/// Spawns cache writes off the response path.
#[derive(Debug, Clone)]
pub struct Writeback {
    failures: mpsc::UnboundedSender<WriteFailure>,
}

impl Writeback {
    /// Create a writeback and the receiving end of its failure channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WriteFailure>) {
        let (failures, rx) = mpsc::unbounded_channel();
        (Self { failures }, rx)
    }

    pub fn spawn<S>(&self, storage: Arc<S>, store: StoreHandle, entry: CacheEntry) -> PendingWrite
    where
        S: CacheStorage + ?Sized + 'static,
    {
        let failures = self.failures.clone();
        let handle = tokio::spawn(async move {
            match storage.put(&store, &entry).await {
                Ok(()) => tracing::debug!(store = store.name(), url = %entry.key.url, "cached response"),
                Err(e) => {
                    tracing::warn!(store = store.name(), url = %entry.key.url, error = %e, "cache write failed");
                    // Receiver gone means nobody is listening; the log line above is enough.
                    let _ = failures.send(WriteFailure {
                        store: store.name().to_string(),
                        url: entry.key.url.clone(),
                        message: e.to_string(),
                    });
                }
            }
        });
        PendingWrite { handle }
    }
}

/// Drain the failure channel into the log until every sender is dropped.
pub fn spawn_failure_logger(mut failures: mpsc::UnboundedReceiver<WriteFailure>) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut count = 0u64;
        while let Some(failure) = failures.recv().await {
            count += 1;
            tracing::error!(
                store = %failure.store,
                url = %failure.url,
                error = %failure.message,
                total = count,
                "background cache write failed"
            );
        }
        count
    })
}
