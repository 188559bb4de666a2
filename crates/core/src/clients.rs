//! Client window seam: the pages a generation controls.

use async_trait::async_trait;

use crate::Error;

#[async_trait]
pub trait Clients: Send + Sync {
    /// Take control of every open client for `generation`. Returns how many
    /// clients were claimed.
    async fn claim(&self, generation: &str) -> Result<usize, Error>;

    /// Focus an existing window at `url`, or open a new one.
    async fn open_window(&self, url: &str) -> Result<(), Error>;
}
