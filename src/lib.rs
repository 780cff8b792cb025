//! slab-exporter - Prometheus exporter for Linux slab allocator statistics.
//!
//! This library provides the pieces used by the `slab-exporter` daemon:
//! - `collector` - `/proc/slabinfo` parsing and measurement expansion
//! - `exposition` - Prometheus text format rendering
//! - `config` - TOML configuration and CLI overrides
//! - `server` - HTTP scrape endpoint

pub mod collector;
pub mod config;
pub mod exposition;
pub mod server;

/// Crate version, reported at startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
