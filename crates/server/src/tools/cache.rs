//! cache_keys tool implementation.
//!
//! Lists every generation store with its entry count and marks the active one.

use offgrid_core::{CacheStorage, Network, StoreHandle};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::host::Host;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreInfo {
    pub name: String,
    pub entries: u64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysOutput {
    /// Name of the generation controlling fetches, if any.
    pub active: Option<String>,
    pub stores: Vec<StoreInfo>,
}

pub async fn cache_keys_impl<N>(host: &Host<N>) -> Result<CallToolResult, McpError>
where
    N: Network + 'static,
{
    let storage = host.registration().storage();
    let active = host.registration().active().await.map(|g| g.name().to_string());

    let mut stores = Vec::new();
    for name in storage.keys().await? {
        let entries = storage.entry_count(&StoreHandle::new(name.as_str())).await?;
        let is_active = active.as_deref() == Some(name.as_str());
        stores.push(StoreInfo { name, entries, active: is_active });
    }

    json_result(&CacheKeysOutput { active, stores })
}
