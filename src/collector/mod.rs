//! Slab allocator metrics collector for Linux.
//!
//! This module reads `/proc/slabinfo` and turns each pool row into labeled
//! gauge measurements, with support for mocking for testing on macOS.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                SlabCollector                │
//! │  LineFilter ─▶ parse_slab ─▶ expand         │
//! └──────────────────────┬──────────────────────┘
//!                        │
//!                 ┌──────▼──────┐
//!                 │  FileSystem │ (trait)
//!                 └──────┬──────┘
//!              ┌─────────┼──────────┐
//!       ┌──────▼──────┐ ┌▼──────────▼┐
//!       │   RealFs    │ │   MockFs    │
//!       │ (Linux)     │ │ (Testing)   │
//!       └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use slab_exporter::collector::{RealFs, SlabCollector};
//!
//! let collector = SlabCollector::new(RealFs::new(), "/proc/slabinfo", None)?;
//! let snapshot = collector.collect();
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use slab_exporter::collector::{MockFs, SlabCollector};
//!
//! let collector =
//!     SlabCollector::new(MockFs::typical_slabinfo(), "/proc/slabinfo", Some("^kmalloc")).unwrap();
//! let snapshot = collector.collect();
//! assert_eq!(snapshot.measurements[0].label_value, "kmalloc_64");
//! ```

pub mod mock;
pub mod slabinfo;
pub mod traits;

pub use mock::MockFs;
pub use slabinfo::{
    Catalog, CollectError, FilterError, LineFilter, Measurement, SlabCollector, Snapshot,
};
pub use traits::{FileSystem, RealFs};
