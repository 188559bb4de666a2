//! Network side of offgrid.
//!
//! This crate provides the reqwest-backed [`Network`](offgrid_core::Network)
//! used by the server, plus URL resolution against the application origin.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, UrlError, canonicalize, resolve};
