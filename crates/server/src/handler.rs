//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the host.
use std::sync::Arc;

use offgrid_client::FetchClient;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::host::Host;
use crate::tools::{
    SwFetchParams, SwNotificationClickParams, SwPushParams, SwSyncParams, SwUpdateParams, cache_keys_impl, click_impl,
    fetch_impl, push_impl, sync_impl, update_impl,
};

/// The main MCP server handler for offgrid.
#[derive(Clone)]
pub struct OffgridServer {
    tool_router: ToolRouter<Self>,
    host: Arc<Host<FetchClient>>,
}

#[tool_router]
impl OffgridServer {
    pub fn new(host: Arc<Host<FetchClient>>) -> Self {
        Self { tool_router: Self::tool_router(), host }
    }

    #[tool(
        description = "Install a cache generation and activate it. Fetches every manifest asset, evicts older generations and claims open clients. Optional version overrides the configured one."
    )]
    async fn sw_update(&self, params: Parameters<SwUpdateParams>) -> Result<CallToolResult, McpError> {
        update_impl(&self.host, params.0).await
    }

    #[tool(
        description = "Intercept a request under the active generation. API paths are network-only with an offline JSON fallback, manifest assets are cache-first, everything else is network-first."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.host, params.0).await
    }

    #[tool(description = "List generation stores with entry counts and the active generation.")]
    async fn cache_keys(&self) -> Result<CallToolResult, McpError> {
        cache_keys_impl(&self.host).await
    }

    #[tool(description = "Deliver a push message. Shows a notification built from the payload, with defaults for missing fields.")]
    async fn sw_push(&self, params: Parameters<SwPushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.host, params.0).await
    }

    #[tool(description = "Click a displayed notification by tag. Dismisses it and opens or focuses its target URL.")]
    async fn sw_notification_click(
        &self, params: Parameters<SwNotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        click_impl(&self.host, params.0).await
    }

    #[tool(description = "Fire a background sync event with the given tag.")]
    async fn sw_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(params.0).await
    }
}

impl ServerHandler for OffgridServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "offgrid".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
