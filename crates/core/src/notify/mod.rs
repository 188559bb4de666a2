//! Notification bridge: push payloads become displayed notifications, and a
//! click opens the notification's target URL.
//!
//! Shares nothing with the cache; it only needs a notification surface and
//! the client window seam.

pub mod payload;

use async_trait::async_trait;

use crate::Error;
use crate::clients::Clients;

pub use payload::{Notification, NotificationDefaults, parse_push};

/// Platform capability that displays and dismisses notifications.
#[async_trait]
pub trait NotificationSurface: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<(), Error>;

    /// Dismiss the notification with `tag`. Returns whether one was showing.
    async fn close(&self, tag: &str) -> Result<bool, Error>;
}

/// Handle a push event: parse the payload and display it.
///
/// # Errors
///
/// Returns the surface error if the notification could not be shown. A bad
/// payload is never an error.
pub async fn on_push<N>(
    payload: Option<&[u8]>, defaults: &NotificationDefaults, surface: &N,
) -> Result<Notification, Error>
where
    N: NotificationSurface + ?Sized,
{
    let notification = parse_push(payload, defaults);
    surface.show(&notification).await?;
    tracing::info!(tag = %notification.tag, title = %notification.title, "notification shown");
    Ok(notification)
}

/// Handle a notification click: dismiss it, then open its target URL.
///
/// A failed dismissal is logged and does not stop the window from opening.
pub async fn on_notification_click<N, C>(notification: &Notification, surface: &N, clients: &C) -> Result<String, Error>
where
    N: NotificationSurface + ?Sized,
    C: Clients + ?Sized,
{
    if let Err(e) = surface.close(&notification.tag).await {
        tracing::warn!(tag = %notification.tag, error = %e, "failed to close notification");
    }

    clients.open_window(&notification.data).await?;
    tracing::info!(tag = %notification.tag, url = %notification.data, "opened notification target");

    Ok(notification.data.clone())
}
