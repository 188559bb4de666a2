//! sw_update tool implementation.
//!
//! Installs a generation and promotes it. Without a version the configured
//! one is used.

use offgrid_core::Network;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::host::Host;

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwUpdateParams {
    /// Version to install instead of the configured one.
    #[serde(default)]
    pub version: Option<String>,
}

pub async fn update_impl<N>(host: &Host<N>, params: SwUpdateParams) -> Result<CallToolResult, McpError>
where
    N: Network + 'static,
{
    let report = host.update(params.version.as_deref()).await?;
    json_result(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{host, result_json};

    #[tokio::test]
    async fn test_update_reports_install_and_activate() {
        let (host, _network) = host().await;

        let result = update_impl(&host, SwUpdateParams::default()).await.unwrap();
        let output = result_json(&result);

        assert_eq!(output["install"]["generation"], "offgrid-v3.3.0");
        assert_eq!(output["install"]["assets_cached"], 5);
        assert_eq!(output["activate"]["evicted"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_update_evicts_previous_generation() {
        let (host, _network) = host().await;
        update_impl(&host, SwUpdateParams::default()).await.unwrap();

        let params = SwUpdateParams { version: Some("3.4.0".into()) };
        let output = result_json(&update_impl(&host, params).await.unwrap());

        assert_eq!(output["activate"]["evicted"], serde_json::json!(["offgrid-v3.3.0"]));
    }

    #[tokio::test]
    async fn test_update_failure_keeps_active_generation() {
        let (host, network) = host().await;
        update_impl(&host, SwUpdateParams::default()).await.unwrap();
        network.set_offline(true);

        let params = SwUpdateParams { version: Some("3.4.0".into()) };
        let result = update_impl(&host, params).await;

        assert!(result.is_err());
        assert_eq!(host.registration().active().await.unwrap().name(), "offgrid-v3.3.0");
    }
}
