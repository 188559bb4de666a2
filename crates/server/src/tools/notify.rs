//! sw_push and sw_notification_click tool implementations.

use offgrid_core::Network;
use offgrid_core::notify::{on_notification_click, on_push};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;
use crate::host::Host;
use crate::runtime::Window;

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwPushParams {
    /// Raw push payload text, normally a JSON object with title, body, icon,
    /// badge, tag and url. Every field, icon and badge included, may override
    /// its configured default. Anything else shows the default notification.
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwNotificationClickParams {
    /// Tag of the notification that was clicked.
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwNotificationClickOutput {
    pub tag: String,
    pub opened: String,
    pub shown_at: String,
    /// Open windows after the click; the opened one is focused.
    pub windows: Vec<Window>,
}

pub async fn push_impl<N>(host: &Host<N>, params: SwPushParams) -> Result<CallToolResult, McpError>
where
    N: Network + 'static,
{
    let payload = params.payload.as_deref().map(str::as_bytes);
    let notification = on_push(payload, &host.config().notifications, host.tray()).await?;
    json_result(&notification)
}

pub async fn click_impl<N>(host: &Host<N>, params: SwNotificationClickParams) -> Result<CallToolResult, McpError>
where
    N: Network + 'static,
{
    let shown = host
        .tray()
        .get(&params.tag)
        .await
        .ok_or_else(|| ToolError::UnknownNotification(params.tag.clone()))?;

    let clients = host.registration().clients();
    let opened = on_notification_click(&shown.notification, host.tray(), clients.as_ref()).await?;
    let windows = clients.windows().await;

    json_result(&SwNotificationClickOutput { tag: params.tag, opened, shown_at: shown.shown_at, windows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{host, result_json};

    #[tokio::test]
    async fn test_push_without_payload_uses_defaults() {
        let (host, _network) = host().await;

        let output = result_json(&push_impl(&host, SwPushParams::default()).await.unwrap());

        assert_eq!(output["title"], "Offgrid Alert");
        assert_eq!(output["tag"], "offgrid-notification");
        assert!(host.tray().get("offgrid-notification").await.is_some());
    }

    #[tokio::test]
    async fn test_click_opens_target_and_dismisses() {
        let (host, _network) = host().await;
        let params = SwPushParams { payload: Some(r#"{"tag":"storm","url":"/alerts/9"}"#.into()) };
        push_impl(&host, params).await.unwrap();

        let result = click_impl(&host, SwNotificationClickParams { tag: "storm".into() }).await.unwrap();

        let output = result_json(&result);
        assert_eq!(output["opened"], "/alerts/9");
        assert_eq!(output["windows"][0]["url"], "/alerts/9");
        assert_eq!(output["windows"][0]["focused"], true);
        assert!(host.tray().get("storm").await.is_none());
    }

    #[tokio::test]
    async fn test_click_unknown_tag() {
        let (host, _network) = host().await;

        let result = click_impl(&host, SwNotificationClickParams { tag: "missing".into() }).await;

        assert!(result.is_err());
    }
}
