//! In-process stand-ins for the browser capabilities the core calls into:
//! controlled client windows and the notification tray.

use std::collections::BTreeMap;

use async_trait::async_trait;
use offgrid_core::{Clients, Error, Notification, NotificationSurface};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// A window the host has opened, and whether the active generation controls it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Window {
    pub url: String,
    pub controller: Option<String>,
    pub focused: bool,
}

/// Open windows, in opening order.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    windows: Mutex<Vec<Window>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn windows(&self) -> Vec<Window> {
        self.windows.lock().await.clone()
    }
}

#[async_trait]
impl Clients for ClientRegistry {
    async fn claim(&self, generation: &str) -> Result<usize, Error> {
        let mut windows = self.windows.lock().await;
        for window in windows.iter_mut() {
            window.controller = Some(generation.to_string());
        }
        Ok(windows.len())
    }

    async fn open_window(&self, url: &str) -> Result<(), Error> {
        let mut windows = self.windows.lock().await;
        let controller = windows.iter().find_map(|w| w.controller.clone());

        for window in windows.iter_mut() {
            window.focused = false;
        }

        if let Some(existing) = windows.iter_mut().find(|w| w.url == url) {
            existing.focused = true;
            tracing::debug!(url, "focused existing window");
        } else {
            windows.push(Window { url: url.to_string(), controller, focused: true });
            tracing::debug!(url, "opened window");
        }
        Ok(())
    }
}

/// A notification currently on display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Shown {
    pub notification: Notification,
    pub shown_at: String,
}

/// Displayed notifications keyed by tag. Showing a tag that is already on
/// display replaces it.
#[derive(Debug, Default)]
pub struct NotificationTray {
    shown: Mutex<BTreeMap<String, Shown>>,
}

impl NotificationTray {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, tag: &str) -> Option<Shown> {
        self.shown.lock().await.get(tag).cloned()
    }
}

#[async_trait]
impl NotificationSurface for NotificationTray {
    async fn show(&self, notification: &Notification) -> Result<(), Error> {
        let shown = Shown { notification: notification.clone(), shown_at: chrono::Utc::now().to_rfc3339() };
        if let Some(previous) = self.shown.lock().await.insert(notification.tag.clone(), shown) {
            tracing::debug!(tag = %previous.notification.tag, "replaced notification");
        }
        Ok(())
    }

    async fn close(&self, tag: &str) -> Result<bool, Error> {
        Ok(self.shown.lock().await.remove(tag).is_some())
    }
}
