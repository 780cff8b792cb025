//! Expansion of parsed slab records into labeled gauge measurements.

use super::parser::SlabInfo;

/// Namespace prefix shared by every exported metric.
pub const NAMESPACE: &str = "slab";
/// Name of the label carrying the pool name.
pub const POOL_LABEL: &str = "slab";

/// One emitted gauge: metric identity, pool label and value.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub metric_name: &'static str,
    pub label_value: String,
    pub value: f64,
    pub description: &'static str,
}

/// Static description of one emitted metric.
pub struct MetricSpec {
    /// Record field the value comes from.
    pub field: &'static str,
    pub metric_name: &'static str,
    pub description: &'static str,
    value: fn(&SlabInfo) -> i64,
}

const fn metric(
    field: &'static str,
    metric_name: &'static str,
    description: &'static str,
    value: fn(&SlabInfo) -> i64,
) -> MetricSpec {
    MetricSpec {
        field,
        metric_name,
        description,
        value,
    }
}

/// Emitted metrics in emission order. `pagesperslab` is parsed but has no
/// entry here.
#[rustfmt::skip]
pub static METRICS: [MetricSpec; 10] = [
    metric("active_objs", "slab_active_objs", "slab active_objs", |s| s.active_objs),
    metric("num_objs", "slab_objs_num", "slab num_objs", |s| s.num_objs),
    metric("objsize", "slab_obj_size", "slab objsize", |s| s.objsize),
    metric("objperslab", "slab_obj_perslab", "slab objperslab", |s| s.objperslab),
    metric("limit", "slab_limit_slabs", "slab limit", |s| s.limit),
    metric("batchcount", "slab_batch_count", "slab batchcount", |s| s.batchcount),
    metric("sharedfactor", "slab_shared_factor", "slab sharedfactor", |s| s.sharedfactor),
    metric("active_slabs", "slab_slabs_active", "slab active_slabs", |s| s.active_slabs),
    metric("num_slabs", "slab_slabs_num", "slab num_slabs", |s| s.num_slabs),
    metric("sharedavail", "slab_shared_avail", "slab sharedavail", |s| s.sharedavail),
];

/// Expands a record into one measurement per entry of [`METRICS`], in order.
pub fn expand(info: &SlabInfo) -> Vec<Measurement> {
    METRICS
        .iter()
        .map(|spec| Measurement {
            metric_name: spec.metric_name,
            label_value: info.name.clone(),
            value: (spec.value)(info) as f64,
            description: spec.description,
        })
        .collect()
}
