//! offgrid server entry point.
//!
//! Boots the host, installs the configured generation and serves MCP on
//! stdio. Logging goes to stderr to avoid interfering with the JSON-RPC
//! protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use offgrid_client::{FetchClient, FetchConfig};
use offgrid_core::worker::spawn_failure_logger;
use offgrid_core::{AppConfig, CacheDb, Writeback};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod host;
mod runtime;
mod tools;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    tracing::info!(
        cache = %config.cache_name(),
        origin = %config.origin,
        db = %config.db_path.display(),
        "starting offgrid server on stdio transport"
    );

    let db = Arc::new(CacheDb::open(&config.db_path).await?);
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let (writeback, failures) = Writeback::new();
    spawn_failure_logger(failures);

    let host = Arc::new(host::Host::new(config, db, network, writeback));
    host.install_on_start().await;

    let handler = handler::OffgridServer::new(host);
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    Ok(())
}
