//! Prometheus text exposition of slab measurements.
//!
//! Every scrape builds a fresh registry so pools that disappeared from
//! slabinfo do not linger as stale series.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::collector::slabinfo::{METRICS, Measurement, POOL_LABEL};

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders measurements in the Prometheus text format.
///
/// The registry sorts families by name and series by label value. Families
/// without any series are left out. When a pool name repeats, the
/// exposition keeps the last value since a gauge family holds a single
/// series per label set.
pub fn render(measurements: &[Measurement]) -> Result<String, prometheus::Error> {
    let registry = Registry::new();

    let mut families = Vec::with_capacity(METRICS.len());
    for spec in &METRICS {
        let gauge = GaugeVec::new(Opts::new(spec.metric_name, spec.description), &[POOL_LABEL])?;
        registry.register(Box::new(gauge.clone()))?;
        families.push((spec.metric_name, gauge));
    }

    for m in measurements {
        let Some((_, gauge)) = families.iter().find(|(name, _)| *name == m.metric_name) else {
            continue;
        };
        gauge
            .get_metric_with_label_values(&[m.label_value.as_str()])?
            .set(m.value);
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| {
        prometheus::Error::Msg(format!("exposition is not valid UTF-8: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::slabinfo::{expand, parse_slab};

    fn measurements(lines: &[&str]) -> Vec<Measurement> {
        lines
            .iter()
            .flat_map(|line| expand(&parse_slab(line).unwrap()))
            .collect()
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]).unwrap(), "");
    }

    #[test]
    fn test_render_single_pool() {
        let text = render(&measurements(&[
            "kmalloc-64 120 128 64 64 1 : tunables 0 0 0 : slabdata 2 2 0",
        ]))
        .unwrap();

        assert!(text.contains("# HELP slab_active_objs slab active_objs\n"));
        assert!(text.contains("# TYPE slab_active_objs gauge\n"));
        assert!(text.contains("slab_active_objs{slab=\"kmalloc_64\"} 120\n"));
        assert!(text.contains("slab_objs_num{slab=\"kmalloc_64\"} 128\n"));
        assert!(text.contains("slab_shared_avail{slab=\"kmalloc_64\"} 0\n"));
        assert!(!text.contains("pagesperslab"));
        assert_eq!(text.matches("# TYPE").count(), 10);
    }

    #[test]
    fn test_render_multiple_pools() {
        let text = render(&measurements(&[
            "dentry 100 200 192 21 1 : tunables 0 0 0 : slabdata 10 10 0",
            "kmalloc-64 120 128 64 64 1 : tunables 0 0 0 : slabdata 2 2 0",
        ]))
        .unwrap();

        assert!(text.contains("slab_obj_size{slab=\"dentry\"} 192\n"));
        assert!(text.contains("slab_obj_size{slab=\"kmalloc_64\"} 64\n"));
    }

    #[test]
    fn test_render_duplicate_pool_keeps_last_value() {
        let text = render(&measurements(&[
            "kmalloc-32 10 20 32 128 1 : tunables 0 0 0 : slabdata 1 1 0",
            "kmalloc.32 30 40 32 128 1 : tunables 0 0 0 : slabdata 2 2 0",
        ]))
        .unwrap();

        assert!(text.contains("slab_active_objs{slab=\"kmalloc_32\"} 30\n"));
        assert_eq!(text.matches("slab_active_objs{").count(), 1);
    }
}
