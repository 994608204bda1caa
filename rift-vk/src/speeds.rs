//! Performance metrics registry and overlay ("r_speeds").
//!
//! Subsystems register named counters once at startup and update them freely
//! afterwards; the host pulls a formatted overlay out of the registry every
//! frame through a bounded byte buffer.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use rift_core::log::debug;

/// Registration is bounded; exceeding this is a configuration error.
pub const MAX_SPEEDS_METRICS: usize = 256;

/// Unit a metric is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Count,
    Bytes,
    Microseconds,
}

/// Shared handle to a registered counter.
///
/// Cloned between the registry and the subsystem that updates it, so the
/// value can never dangle on either side.
#[derive(Clone, Debug, Default)]
pub struct MetricValue(Arc<AtomicI64>);

impl MetricValue {
    pub fn set(&self, value: i64) {
        self.0.store(value, Ordering::Relaxed);
    }

    pub fn add(&self, delta: i64) {
        self.0.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Metric registration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedsError {
    /// The registry holds `MAX_SPEEDS_METRICS` entries already.
    RegistryFull,
}

impl std::fmt::Display for SpeedsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeedsError::RegistryFull => write!(
                f,
                "Metrics registry is full ({} entries)",
                MAX_SPEEDS_METRICS
            ),
        }
    }
}

impl std::error::Error for SpeedsError {}

struct Metric {
    value: MetricValue,
    module: &'static str,
    name: String,
    kind: MetricKind,
}

/// Process-wide list of registered metrics, owned by the renderer context.
pub struct SpeedsRegistry {
    metrics: Vec<Metric>,
}

impl Default for SpeedsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedsRegistry {
    pub fn new() -> Self {
        Self {
            metrics: Vec::with_capacity(MAX_SPEEDS_METRICS),
        }
    }

    /// Register a counter and hand back the shared value to update.
    ///
    /// `var_name`/`file`/`line` identify the registering declaration and end
    /// up in the debug log only; use [`speeds_metric!`](crate::speeds_metric)
    /// to bind them automatically.
    pub fn register(
        &mut self,
        module: &'static str,
        name: &str,
        kind: MetricKind,
        var_name: &'static str,
        file: &'static str,
        line: u32,
    ) -> Result<MetricValue, SpeedsError> {
        if self.metrics.len() >= MAX_SPEEDS_METRICS {
            return Err(SpeedsError::RegistryFull);
        }

        debug!("Registered metric {module}.{name} ({var_name} at {file}:{line})");

        let value = MetricValue::default();
        self.metrics.push(Metric {
            value: value.clone(),
            module,
            name: name.to_owned(),
            kind,
        });
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Render the overlay into `out`, one `module.name: value` line per
    /// metric.
    ///
    /// The output is always NUL-terminated within `out`. Returns whether
    /// every metric fit; on `false` the overlay is truncated at a line
    /// boundary.
    pub fn message(&self, out: &mut [u8]) -> bool {
        let Some(capacity) = out.len().checked_sub(1) else {
            return false;
        };

        let mut written = 0;
        let mut fit = true;
        for metric in &self.metrics {
            let line = format_metric(metric);
            let bytes = line.as_bytes();
            if written + bytes.len() > capacity {
                fit = false;
                break;
            }
            out[written..written + bytes.len()].copy_from_slice(bytes);
            written += bytes.len();
        }

        out[written] = 0;
        fit
    }
}

fn format_metric(metric: &Metric) -> String {
    let value = metric.value.get();
    match metric.kind {
        MetricKind::Count => format!("{}.{}: {}\n", metric.module, metric.name, value),
        MetricKind::Bytes => format!(
            "{}.{}: {}\n",
            metric.module,
            metric.name,
            format_bytes(value)
        ),
        MetricKind::Microseconds => {
            format!("{}.{}: {}us\n", metric.module, metric.name, value)
        }
    }
}

fn format_bytes(value: i64) -> String {
    const KIB: i64 = 1024;
    const MIB: i64 = 1024 * KIB;
    if value.abs() >= MIB {
        format!("{:.2}MiB", value as f64 / MIB as f64)
    } else if value.abs() >= KIB {
        format!("{:.2}KiB", value as f64 / KIB as f64)
    } else {
        format!("{}B", value)
    }
}

/// Register a metric, binding module path, variable name and source location
/// automatically.
#[macro_export]
macro_rules! speeds_metric {
    ($registry:expr, $var:ident, $kind:expr) => {
        $registry.register(
            module_path!(),
            stringify!($var),
            $kind,
            stringify!($var),
            file!(),
            line!(),
        )
    };
    ($registry:expr, $var:ident, $name:expr, $kind:expr) => {
        $registry.register(
            module_path!(),
            $name,
            $kind,
            stringify!($var),
            file!(),
            line!(),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cstr_len(out: &[u8]) -> usize {
        out.iter().position(|&b| b == 0).expect("missing NUL")
    }

    #[test]
    fn overlay_contains_all_kinds() {
        let mut registry = SpeedsRegistry::new();

        let draws = speeds_metric!(registry, draws, MetricKind::Count).unwrap();
        let heap = speeds_metric!(registry, heap, "heap_bytes", MetricKind::Bytes).unwrap();
        let frame = speeds_metric!(registry, frame, MetricKind::Microseconds).unwrap();

        draws.set(17);
        heap.set(3 * 1024 * 1024);
        frame.set(1250);

        let mut out = [0xffu8; 256];
        assert!(registry.message(&mut out));

        let end = cstr_len(&out);
        assert!(end < out.len());
        let text = std::str::from_utf8(&out[..end]).unwrap();

        assert!(text.contains("draws: 17"), "{text}");
        assert!(text.contains("heap_bytes: 3.00MiB"), "{text}");
        assert!(text.contains("frame: 1250us"), "{text}");
    }

    #[test]
    fn overlay_truncates_at_line_boundary() {
        let mut registry = SpeedsRegistry::new();
        for i in 0..32 {
            let value = registry
                .register("mod", &format!("metric_{i}"), MetricKind::Count, "v", "f", 0)
                .unwrap();
            value.set(i);
        }

        let mut out = [0xffu8; 64];
        assert!(!registry.message(&mut out));

        let end = cstr_len(&out);
        assert!(end < out.len());
        let text = std::str::from_utf8(&out[..end]).unwrap();
        // Whatever fit ends with a complete line.
        assert!(text.is_empty() || text.ends_with('\n'));
    }

    #[test]
    fn overlay_with_empty_buffer() {
        let registry = SpeedsRegistry::new();
        assert!(!registry.message(&mut []));

        let mut single = [0xffu8; 1];
        assert!(registry.message(&mut single));
        assert_eq!(single[0], 0);
    }

    #[test]
    fn registration_overflow_is_reported() {
        let mut registry = SpeedsRegistry::new();
        for i in 0..MAX_SPEEDS_METRICS {
            registry
                .register("mod", &format!("m{i}"), MetricKind::Count, "v", "f", 0)
                .unwrap();
        }
        assert_eq!(registry.len(), MAX_SPEEDS_METRICS);
        let err = registry
            .register("mod", "extra", MetricKind::Count, "v", "f", 0)
            .unwrap_err();
        assert_eq!(err, SpeedsError::RegistryFull);
        assert_eq!(registry.len(), MAX_SPEEDS_METRICS);
    }

    #[test]
    fn metric_value_is_shared() {
        let mut registry = SpeedsRegistry::new();
        let value = speeds_metric!(registry, shared, MetricKind::Count).unwrap();
        value.add(5);
        value.add(-2);

        let mut out = [0u8; 64];
        assert!(registry.message(&mut out));
        let text = std::str::from_utf8(&out[..cstr_len(&out)]).unwrap();
        assert!(text.contains("shared: 3"), "{text}");
    }
}
