//! Per-generation lifecycle: install populates the store, activate evicts
//! every other generation and claims open clients.
//!
//! States advance `Installing -> Waiting -> Activating -> Active`. A failed
//! install ends in `Redundant` and the generation is never promoted.

use std::sync::Arc;

use futures_util::future::{join_all, try_join_all};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::cache::{CacheEntry, CacheStorage};
use crate::clients::Clients;
use crate::generation::Generation;
use crate::http::Request;
use crate::network::Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Installing,
    Waiting,
    Activating,
    Active,
    Redundant,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Installing => write!(f, "installing"),
            LifecycleState::Waiting => write!(f, "waiting"),
            LifecycleState::Activating => write!(f, "activating"),
            LifecycleState::Active => write!(f, "active"),
            LifecycleState::Redundant => write!(f, "redundant"),
        }
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallReport {
    pub generation: String,
    pub assets_cached: usize,
    /// The generation may activate without waiting for old clients to close.
    pub skip_waiting: bool,
}

/// Result of an activation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActivateReport {
    pub generation: String,
    pub evicted: Vec<String>,
    /// Stale stores whose deletion failed; they are retried on the next activation.
    pub eviction_failures: Vec<String>,
    pub clients_claimed: usize,
}

/// Lifecycle controller for one generation.
#[derive(Debug)]
pub struct Controller {
    generation: Arc<Generation>,
    state: LifecycleState,
    skip_waiting: bool,
}

impl Controller {
    pub fn new(generation: Arc<Generation>) -> Self {
        Self { generation, state: LifecycleState::Installing, skip_waiting: false }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Set once install succeeds.
    pub fn skip_waiting(&self) -> bool {
        self.skip_waiting
    }

    fn expect_state(&self, expected: LifecycleState, operation: &str) -> Result<(), Error> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "{operation} requires {expected}, generation {} is {}",
                self.generation.name(),
                self.state
            )))
        }
    }

    /// Fetch every manifest asset and commit them to the generation's store.
    ///
    /// All-or-nothing: a transport failure or non-2xx status on any asset
    /// fails the install with `Error::InstallFailure` and nothing is written.
    pub async fn install<S, N>(&mut self, storage: &S, network: &N) -> Result<InstallReport, Error>
    where
        S: CacheStorage + ?Sized,
        N: Network + ?Sized,
    {
        self.expect_state(LifecycleState::Installing, "install")?;

        let name = self.generation.name().to_string();
        tracing::info!(
            generation = %name,
            assets = self.generation.manifest().entries().len(),
            "installing generation"
        );

        match populate(&self.generation, storage, network).await {
            Ok(assets_cached) => {
                self.state = LifecycleState::Waiting;
                self.skip_waiting = true;
                tracing::info!(generation = %name, assets_cached, "generation installed");
                Ok(InstallReport { generation: name, assets_cached, skip_waiting: true })
            }
            Err(e) => {
                self.state = LifecycleState::Redundant;
                tracing::warn!(generation = %name, error = %e, "install failed, generation not promoted");
                Err(e)
            }
        }
    }

    /// Evict every store except this generation's, then claim open clients.
    ///
    /// Eviction and claim failures are logged and reported, never returned.
    pub async fn activate<S, C>(&mut self, storage: &S, clients: &C) -> Result<ActivateReport, Error>
    where
        S: CacheStorage + ?Sized,
        C: Clients + ?Sized,
    {
        self.expect_state(LifecycleState::Waiting, "activate")?;
        self.state = LifecycleState::Activating;

        let current = self.generation.name().to_string();
        tracing::info!(generation = %current, "activating generation");

        let names = storage.keys().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not enumerate stores, skipping eviction");
            Vec::new()
        });

        let stale: Vec<String> = names.into_iter().filter(|name| *name != current).collect();
        let results = join_all(stale.iter().map(|name| storage.delete_store(name))).await;

        let mut evicted = Vec::new();
        let mut eviction_failures = Vec::new();
        for (name, result) in stale.into_iter().zip(results) {
            match result {
                Ok(_) => {
                    tracing::info!(store = %name, "deleted stale cache");
                    evicted.push(name);
                }
                Err(e) => {
                    tracing::warn!(store = %name, error = %e, "failed to delete stale cache");
                    eviction_failures.push(name);
                }
            }
        }

        let clients_claimed = clients.claim(&current).await.unwrap_or_else(|e| {
            tracing::warn!(generation = %current, error = %e, "failed to claim clients");
            0
        });

        self.state = LifecycleState::Active;
        tracing::info!(generation = %current, evicted = evicted.len(), clients_claimed, "generation active");

        Ok(ActivateReport { generation: current, evicted, eviction_failures, clients_claimed })
    }
}

async fn populate<S, N>(generation: &Generation, storage: &S, network: &N) -> Result<usize, Error>
where
    S: CacheStorage + ?Sized,
    N: Network + ?Sized,
{
    let urls = generation
        .asset_urls()
        .map_err(|e| Error::InstallFailure(e.to_string()))?;

    let store = storage
        .open(generation.name())
        .await
        .map_err(|e| Error::InstallFailure(format!("open {}: {e}", generation.name())))?;

    let fetches = urls.into_iter().map(|url| async move {
        let request = Request::get(url);
        let response = network
            .fetch(&request)
            .await
            .map_err(|e| Error::InstallFailure(format!("{}: {e}", request.url)))?;
        if !response.ok() {
            return Err(Error::InstallFailure(format!("{}: status {}", request.url, response.status)));
        }
        Ok(CacheEntry::capture(request.key(), &response))
    });
    let entries = try_join_all(fetches).await?;

    storage
        .put_all(&store, &entries)
        .await
        .map_err(|e| Error::InstallFailure(format!("commit {}: {e}", generation.name())))?;

    Ok(entries.len())
}
