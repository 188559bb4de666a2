//! sw_fetch tool implementation.
//!
//! Intercepts one request under the active generation. Requests the router
//! does not intercept are performed directly against the network, as the
//! browser would.

use offgrid_client::resolve;
use offgrid_core::{Error, Network, Outcome, Request, Response, ResponseSource};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;
use crate::host::Host;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Wait for any background store write to settle before returning.
    #[serde(default)]
    pub wait_for_write: bool,
}

fn default_method() -> String {
    "GET".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    pub url: String,
    pub method: String,
    /// Whether the active generation intercepted the request.
    pub intercepted: bool,
    /// Request class under the active generation: api, static or other.
    pub class: Option<String>,
    /// network, cache or offline. Absent on a network error.
    pub source: Option<ResponseSource>,
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 with replacement characters.
    pub body: Option<String>,
    /// Connectivity failure surfaced to the page.
    pub error: Option<String>,
}

impl SwFetchOutput {
    fn new(request: &Request, intercepted: bool, class: Option<String>) -> Self {
        Self {
            url: request.url.to_string(),
            method: request.method.clone(),
            intercepted,
            class,
            source: None,
            status: None,
            headers: Vec::new(),
            body: None,
            error: None,
        }
    }

    fn with_response(mut self, response: Response, source: ResponseSource) -> Self {
        self.status = Some(response.status);
        self.body = Some(String::from_utf8_lossy(&response.body).into_owned());
        self.headers = response.headers;
        self.source = Some(source);
        self
    }

    fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }
}

pub async fn fetch_impl<N>(host: &Host<N>, params: SwFetchParams) -> Result<CallToolResult, McpError>
where
    N: Network + 'static,
{
    if params.method.trim().is_empty() {
        return Err(ToolError::InvalidInput("method cannot be empty".into()).into());
    }

    let origin = match host.registration().active().await {
        Some(generation) => generation.origin().clone(),
        None => url::Url::parse(&host.config().origin).map_err(|e| Error::InvalidUrl(e.to_string()))?,
    };
    let url = resolve(&origin, &params.url).map_err(ToolError::from)?;
    let request = Request::new(params.method.trim(), url);

    let routed = host.registration().handle_fetch(&request).await;
    let class = routed.class.map(|c| c.to_string());

    let output = match routed.outcome {
        Outcome::PassThrough => {
            let output = SwFetchOutput::new(&request, false, class);
            match host.registration().network().fetch(&request).await {
                Ok(response) => output.with_response(response, ResponseSource::Network),
                Err(e) => output.with_error(e.to_string()),
            }
        }
        Outcome::Respond { response, source } => {
            SwFetchOutput::new(&request, true, class).with_response(response, source)
        }
        Outcome::NetworkError(message) => SwFetchOutput::new(&request, true, class).with_error(message),
    };

    if params.wait_for_write
        && let Some(write) = routed.write
    {
        write.settled().await;
    }

    json_result(&output)
}
