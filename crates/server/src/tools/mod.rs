//! MCP tool implementations.
//!
//! Each tool is an `*_impl` function over a [`Host`](crate::host::Host), so
//! tests can drive it with a stub network.

pub mod cache;
pub mod fetch;
pub mod notify;
pub mod sync;
pub mod update;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

pub use cache::cache_keys_impl;
pub use fetch::{SwFetchParams, fetch_impl};
pub use notify::{SwNotificationClickParams, SwPushParams, click_impl, push_impl};
pub use sync::{SwSyncParams, sync_impl};
pub use update::{SwUpdateParams, update_impl};

/// Pretty JSON text result.
fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| offgrid_core::Error::Serialization(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
