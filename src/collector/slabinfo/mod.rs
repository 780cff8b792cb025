//! Collector for `/proc/slabinfo`.
//!
//! Data flow for one pass:
//!
//! ```text
//! slabinfo line ─▶ LineFilter ─▶ parse_slab ─▶ SlabInfo ─▶ expand ─▶ [Measurement; 10]
//! ```

pub mod collector;
pub mod filter;
pub mod mapper;
pub mod parser;

pub use collector::{
    Catalog, CollectError, DEFAULT_SLABINFO_PATH, MetricDesc, SlabCollector, Snapshot,
};
pub use filter::{FilterError, LineFilter};
pub use mapper::{METRICS, Measurement, MetricSpec, NAMESPACE, POOL_LABEL, expand};
pub use parser::{ParseError, ROW_SCHEMA, SlabInfo, normalize_name, parse_slab};
