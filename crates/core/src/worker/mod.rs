//! Interception core: lifecycle controller, request router and the
//! registration that ties them to the active generation.

pub mod lifecycle;
pub mod registration;
pub mod router;
pub mod sync;
pub mod writeback;

pub use lifecycle::{ActivateReport, Controller, InstallReport, LifecycleState};
pub use registration::{Registration, UpdateReport};
pub use router::{OFFLINE_ERROR, Outcome, ResponseSource, Routed, Router, offline_response};
pub use sync::{SYNC_DATA_TAG, SyncOutcome, handle_sync};
pub use writeback::{PendingWrite, WriteFailure, Writeback, spawn_failure_logger};
