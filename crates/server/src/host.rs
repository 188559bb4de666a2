//! The host: one registration plus the platform state its events act on.

use std::sync::Arc;

use offgrid_core::{AppConfig, CacheDb, Error, Generation, Network, Registration, UpdateReport, Writeback};

use crate::runtime::{ClientRegistry, NotificationTray};

pub struct Host<N> {
    config: AppConfig,
    registration: Registration<CacheDb, N, ClientRegistry>,
    tray: NotificationTray,
}

impl<N> Host<N>
where
    N: Network + 'static,
{
    pub fn new(config: AppConfig, db: Arc<CacheDb>, network: Arc<N>, writeback: Writeback) -> Self {
        let registration = Registration::new(db, network, Arc::new(ClientRegistry::new()), writeback);
        Self { config, registration, tray: NotificationTray::new() }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registration(&self) -> &Registration<CacheDb, N, ClientRegistry> {
        &self.registration
    }

    pub fn tray(&self) -> &NotificationTray {
        &self.tray
    }

    /// Install and activate the generation named by `version`, or the
    /// configured version when `None`.
    pub async fn update(&self, version: Option<&str>) -> Result<UpdateReport, Error> {
        let generation = match version {
            Some(version) => Generation::from_config_with_version(&self.config, version)?,
            None => Generation::from_config(&self.config)?,
        };
        self.registration.update(generation).await
    }

    /// Startup install. When it fails, a fully populated store left by an
    /// earlier run of the configured generation is adopted instead; failing
    /// that the host serves pass-through until an update succeeds.
    pub async fn install_on_start(&self) {
        if !self.config.install_on_start {
            tracing::info!("install on start disabled");
            return;
        }

        match self.update(None).await {
            Ok(report) => tracing::info!(
                generation = %report.install.generation,
                assets = report.install.assets_cached,
                evicted = report.activate.evicted.len(),
                "startup install complete"
            ),
            Err(e) => {
                tracing::warn!(error = %e, "startup install failed");
                match self.restore_configured().await {
                    Ok(true) => tracing::info!("serving previously installed generation"),
                    Ok(false) => tracing::error!("no installed generation to restore, serving pass-through"),
                    Err(e) => tracing::error!(error = %e, "restore failed, serving pass-through"),
                }
            }
        }
    }

    async fn restore_configured(&self) -> Result<bool, Error> {
        let generation = Generation::from_config(&self.config)?;
        self.registration.restore(generation).await
    }
}
