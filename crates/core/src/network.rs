//! Network seam used by install and by the request router.

use async_trait::async_trait;

use crate::Error;
use crate::http::{Request, Response};

/// Performs a live fetch.
///
/// Any HTTP status is a successful fetch; `Err` means the request never
/// produced a response (connection refused, timeout, body too large) and
/// triggers the caller's offline fallback.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}
