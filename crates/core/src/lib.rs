//! Core types and interception logic for offgrid.
//!
//! This crate provides:
//! - Generation stores with a SQLite backend
//! - Install/activate lifecycle and the per-request routing policy
//! - Push notification handling
//! - Unified error types and layered configuration

pub mod cache;
pub mod clients;
pub mod config;
pub mod error;
pub mod generation;
pub mod http;
pub mod manifest;
pub mod network;
pub mod notify;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheDb, CacheEntry, CacheStorage, StoreHandle};
pub use clients::Clients;
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use generation::{Generation, RequestClass};
pub use http::{Request, RequestKey, Response};
pub use manifest::{AssetManifest, MatchMode};
pub use network::Network;
pub use notify::{Notification, NotificationDefaults, NotificationSurface};
pub use worker::{Outcome, Registration, ResponseSource, Routed, UpdateReport, Writeback};
