//! Hosts over an in-memory cache and a path-keyed stub network.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use offgrid_core::{AppConfig, CacheDb, Error, Network, Request, Response, Writeback};
use tokio::sync::Mutex;

use crate::host::Host;

#[derive(Default)]
pub(crate) struct StubNetwork {
    routes: Mutex<HashMap<String, (u16, String)>>,
    offline: AtomicBool,
}

impl StubNetwork {
    pub(crate) async fn serve(&self, path: &str, status: u16, body: &str) {
        self.routes.lock().await.insert(path.to_string(), (status, body.to_string()));
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("unreachable: {}", request.url)));
        }
        let route = self.routes.lock().await.get(request.url.path()).cloned();
        let (status, body) = route.unwrap_or((404, "not found".to_string()));
        Ok(Response::new(status, vec![("content-type".into(), "text/plain".into())], body))
    }
}

/// Host whose network serves every default manifest asset.
pub(crate) async fn host() -> (Host<StubNetwork>, Arc<StubNetwork>) {
    let config = AppConfig::default();
    let network = Arc::new(StubNetwork::default());
    for path in &config.assets {
        network.serve(path, 200, &format!("asset {path}")).await;
    }

    let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
    let (writeback, _failures) = Writeback::new();
    (Host::new(config, db, network.clone(), writeback), network)
}

/// Host whose network is unreachable.
pub(crate) async fn offline_host() -> Host<StubNetwork> {
    let (host, network) = host().await;
    network.set_offline(true);
    host
}

/// Text payload of the first content item of a tool result.
pub(crate) fn result_json(result: &rmcp::model::CallToolResult) -> serde_json::Value {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content.get("text").and_then(|v| v.as_str()).unwrap();
    serde_json::from_str(text).unwrap()
}
