//! Registration: the active generation and the path from a new generation to
//! promotion.
//!
//! The active generation is only replaced after the new generation's install
//! has committed; a failed install leaves the previous generation serving.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use super::lifecycle::{ActivateReport, Controller, InstallReport};
use super::router::{Routed, Router};
use super::writeback::Writeback;
use crate::Error;
use crate::cache::{CacheStorage, StoreHandle};
use crate::clients::Clients;
use crate::generation::Generation;
use crate::http::Request;
use crate::network::Network;

/// Install and activation reports for one promoted generation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateReport {
    pub install: InstallReport,
    pub activate: ActivateReport,
}

pub struct Registration<S, N, C> {
    storage: Arc<S>,
    network: Arc<N>,
    clients: Arc<C>,
    router: Router<S, N>,
    active: RwLock<Option<Arc<Generation>>>,
    updating: Mutex<()>,
}

impl<S, N, C> Registration<S, N, C>
where
    S: CacheStorage + 'static,
    N: Network + 'static,
    C: Clients + 'static,
{
    pub fn new(storage: Arc<S>, network: Arc<N>, clients: Arc<C>, writeback: Writeback) -> Self {
        let router = Router::new(storage.clone(), network.clone(), writeback);
        Self { storage, network, clients, router, active: RwLock::new(None), updating: Mutex::new(()) }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn network(&self) -> &Arc<N> {
        &self.network
    }

    pub fn clients(&self) -> &Arc<C> {
        &self.clients
    }

    /// The generation currently controlling fetches, if any.
    pub async fn active(&self) -> Option<Arc<Generation>> {
        self.active.read().await.clone()
    }

    /// Install `generation` and, since install signals skip-waiting, activate
    /// it immediately.
    ///
    /// Only one update runs at a time, so no two installs write the same
    /// store concurrently.
    ///
    /// # Errors
    ///
    /// Returns the install error; the active generation is unchanged.
    pub async fn update(&self, generation: Generation) -> Result<UpdateReport, Error> {
        let _guard = self.updating.lock().await;

        let generation = Arc::new(generation);
        let mut controller = Controller::new(generation.clone());

        let install = controller.install(self.storage.as_ref(), self.network.as_ref()).await?;

        let previous = self.active.write().await.replace(generation.clone());
        tracing::info!(
            generation = generation.name(),
            previous = previous.as_deref().map(Generation::name),
            "promoting generation"
        );

        let activate = controller.activate(self.storage.as_ref(), self.clients.as_ref()).await?;

        Ok(UpdateReport { install, activate })
    }

    /// Adopt an already installed `generation` without touching the network.
    ///
    /// The store must exist and hold an entry for every manifest asset; a
    /// missing or partial store is left alone and `false` is returned. The
    /// store is never created here.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the store cannot be inspected.
    pub async fn restore(&self, generation: Generation) -> Result<bool, Error> {
        let _guard = self.updating.lock().await;

        if !self.storage.keys().await?.iter().any(|name| name == generation.name()) {
            tracing::debug!(generation = generation.name(), "no store to restore");
            return Ok(false);
        }

        let store = StoreHandle::new(generation.name());
        for url in generation.asset_urls()? {
            if self.storage.get(&store, &Request::get(url.clone()).key()).await?.is_none() {
                tracing::warn!(generation = generation.name(), %url, "store is missing an asset, not restoring");
                return Ok(false);
            }
        }

        tracing::info!(generation = generation.name(), "restored installed generation");
        *self.active.write().await = Some(Arc::new(generation));
        Ok(true)
    }

    /// Route an intercepted request under the active generation. With no
    /// active generation nothing is intercepted.
    pub async fn handle_fetch(&self, request: &Request) -> Routed {
        match self.active().await {
            Some(generation) => self.router.route(&generation, request).await,
            None => Routed::pass_through(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheDb, CacheEntry};
    use crate::testing::{MockNetwork, RecordingClients, generation, get};
    use crate::worker::router::{Outcome, ResponseSource};

    async fn registration() -> (Registration<CacheDb, MockNetwork, RecordingClients>, Arc<MockNetwork>) {
        let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let network = Arc::new(MockNetwork::new());
        network.serve("/", 200, "<html>v1</html>");
        network.serve("/css/styles.css", 200, "body{}");
        network.serve("/js/app.js", 200, "main()");
        let (writeback, _failures) = Writeback::new();
        let registration = Registration::new(db, network.clone(), Arc::new(RecordingClients::new()), writeback);
        (registration, network)
    }

    fn source(routed: &Routed) -> Option<ResponseSource> {
        match &routed.outcome {
            Outcome::Respond { source, .. } => Some(*source),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_no_active_generation_passes_through() {
        let (registration, network) = registration().await;

        let routed = registration.handle_fetch(&get("/css/styles.css")).await;

        assert_eq!(routed.outcome, Outcome::PassThrough);
        assert_eq!(network.call_count(), 0);
    }

    #[tokio::test]
    async fn test_installed_assets_served_without_network() {
        let (registration, network) = registration().await;
        registration.update(generation("1")).await.unwrap();
        let installs = network.call_count();

        for path in ["/", "/css/styles.css", "/js/app.js"] {
            let routed = registration.handle_fetch(&get(path)).await;
            assert_eq!(source(&routed), Some(ResponseSource::Cache), "{path}");
        }
        assert_eq!(network.call_count(), installs);
    }

    #[tokio::test]
    async fn test_update_evicts_previous_generation() {
        let (registration, _network) = registration().await;
        registration.update(generation("1")).await.unwrap();

        let report = registration.update(generation("2")).await.unwrap();

        assert_eq!(report.activate.evicted, ["offgrid-v1"]);
        assert_eq!(registration.storage().keys().await.unwrap(), vec!["offgrid-v2".to_string()]);
        assert_eq!(registration.active().await.unwrap().name(), "offgrid-v2");
        assert_eq!(registration.clients().claims(), ["offgrid-v1", "offgrid-v2"]);
    }

    #[tokio::test]
    async fn test_restore_adopts_installed_store() {
        let (registration, _network) = registration().await;
        registration.update(generation("1")).await.unwrap();

        let (writeback, _failures) = Writeback::new();
        let offline = Arc::new(MockNetwork::new());
        offline.set_offline(true);
        let restarted =
            Registration::new(registration.storage().clone(), offline.clone(), Arc::new(RecordingClients::new()), writeback);

        assert!(restarted.restore(generation("1")).await.unwrap());
        assert_eq!(restarted.active().await.unwrap().name(), "offgrid-v1");
        let routed = restarted.handle_fetch(&get("/js/app.js")).await;
        assert_eq!(source(&routed), Some(ResponseSource::Cache));
        assert_eq!(offline.call_count(), 0);
    }

    #[tokio::test]
    async fn test_restore_rejects_missing_or_partial_store() {
        let (registration, _network) = registration().await;

        assert!(!registration.restore(generation("1")).await.unwrap());
        assert!(registration.storage().keys().await.unwrap().is_empty());

        let store = registration.storage().open("offgrid-v1").await.unwrap();
        let root = get("/");
        let entry = CacheEntry::capture(root.key(), &crate::Response::new(200, Vec::new(), "<html>v1</html>"));
        registration.storage().put(&store, &entry).await.unwrap();

        assert!(!registration.restore(generation("1")).await.unwrap());
        assert!(registration.active().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_install_keeps_previous_generation() {
        let (registration, network) = registration().await;
        registration.update(generation("1")).await.unwrap();

        network.serve("/js/app.js", 503, "maintenance");
        let result = registration.update(generation("2")).await;

        assert!(matches!(result, Err(Error::InstallFailure(_))));
        assert_eq!(registration.active().await.unwrap().name(), "offgrid-v1");

        network.set_offline(true);
        let cached = registration.handle_fetch(&get("/js/app.js")).await;
        assert_eq!(source(&cached), Some(ResponseSource::Cache));
        let api = registration.handle_fetch(&get("/api/news")).await;
        assert_eq!(source(&api), Some(ResponseSource::Offline));
    }
}
