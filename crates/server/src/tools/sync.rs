//! sw_sync tool implementation.

use offgrid_core::worker::{SyncOutcome, handle_sync};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncParams {
    /// Sync registration tag.
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncOutput {
    pub tag: String,
    pub outcome: SyncOutcome,
}

pub async fn sync_impl(params: SwSyncParams) -> Result<CallToolResult, McpError> {
    let outcome = handle_sync(&params.tag);
    json_result(&SwSyncOutput { tag: params.tag, outcome })
}
