//! SQLite-backed generation stores.
//!
//! This module provides the persistent key-to-response store using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Named stores, one per cache generation
//! - Request-identity keys hashed with SHA-256
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use store::{CacheEntry, CacheStorage, StoreHandle};
