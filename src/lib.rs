//! Courier-Oxide: Rust-based remote browser-automation session service
//!
//! This library provides both sides of a stateful single-endpoint HTTP
//! protocol that multiplexes browser automation sessions behind a
//! bounded worker pool: the HTTP service and worker pool on one side,
//! and a transport client with session handles on the other.

pub mod error;
pub mod config;

pub mod protocol;
pub mod backend;
pub mod pool;
pub mod pipeline;
pub mod server;
pub mod client;

// Re-exports
pub use error::{Error, Result};

/// Courier-Oxide library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
