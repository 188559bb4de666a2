//! Tool-level errors that do not originate in the core.

use offgrid_client::UrlError;
use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid tool parameters.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The URL could not be resolved against the origin.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(#[from] UrlError),

    /// No notification with this tag is on display.
    #[error("NOT_FOUND: no notification tagged {0}")]
    UnknownNotification(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let code = match &err {
            ToolError::InvalidInput(_) => -32602,
            ToolError::InvalidUrl(_) => -32003,
            ToolError::UnknownNotification(_) => -32004,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
