//! Background sync events.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tag the application registers for deferred data sync.
pub const SYNC_DATA_TAG: &str = "sync-data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    Handled,
    Ignored,
}

/// Handle a sync event. No offline queue exists yet, so a recognised tag is
/// only logged.
pub fn handle_sync(tag: &str) -> SyncOutcome {
    if tag == SYNC_DATA_TAG {
        tracing::info!(tag, "background sync triggered");
        SyncOutcome::Handled
    } else {
        tracing::debug!(tag, "ignoring unknown sync tag");
        SyncOutcome::Ignored
    }
}
