//! Monotonic counter instrument

use dashmap::DashMap;
use std::sync::Arc;

use super::atomic::AtomicF64;
use super::labels::LabelSchema;
use super::snapshot::{MetricSnapshot, SeriesSnapshot, SeriesValue};
use super::types::{MetricKind, MetricMeta};
use crate::errors::{MetricsError, Result};

struct CounterInner {
    meta: MetricMeta,
    series: DashMap<Box<[String]>, Arc<AtomicF64>>,
}

/// Label-keyed, monotonically non-decreasing counter.
///
/// Cloning is cheap; clones share the same series.
#[derive(Clone)]
pub struct Counter {
    inner: Arc<CounterInner>,
}

impl Counter {
    pub(crate) fn new(name: &str, help: &str, schema: LabelSchema) -> Self {
        Self {
            inner: Arc::new(CounterInner {
                meta: MetricMeta::new(name, help, schema),
                series: DashMap::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.meta.name
    }

    pub fn label_names(&self) -> &[String] {
        self.inner.meta.schema.names()
    }

    /// Add 1 to the series identified by `label_values`.
    pub fn inc(&self, label_values: &[&str]) -> Result<()> {
        self.inc_by(label_values, 1.0)
    }

    /// Add `delta` (finite, >= 0) to the series identified by `label_values`.
    pub fn inc_by(&self, label_values: &[&str], delta: f64) -> Result<()> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(MetricsError::invalid_value(format!(
                "counter '{}' cannot be incremented by {}",
                self.name(),
                delta
            )));
        }
        let key = self.inner.meta.schema.series_key(self.name(), label_values)?;
        self.series(key).add(delta);
        Ok(())
    }

    /// Current value of a series, `0` if it was never observed.
    pub fn get(&self, label_values: &[&str]) -> Result<f64> {
        let key = self.inner.meta.schema.series_key(self.name(), label_values)?;
        Ok(self
            .inner
            .series
            .get(&key)
            .map(|cell| cell.get())
            .unwrap_or(0.0))
    }

    fn series(&self, key: Box<[String]>) -> Arc<AtomicF64> {
        if let Some(cell) = self.inner.series.get(&key) {
            return Arc::clone(cell.value());
        }
        self.inner
            .series
            .entry(key)
            .or_insert_with(|| Arc::new(AtomicF64::default()))
            .value()
            .clone()
    }

    pub(crate) fn snapshot(&self) -> MetricSnapshot {
        let mut series: Vec<SeriesSnapshot> = self
            .inner
            .series
            .iter()
            .map(|entry| SeriesSnapshot {
                label_values: entry.key().to_vec(),
                value: SeriesValue::Counter(entry.value().get()),
            })
            .collect();
        series.sort_by(|a, b| a.label_values.cmp(&b.label_values));

        MetricSnapshot {
            name: self.inner.meta.name.clone(),
            help: self.inner.meta.help.clone(),
            kind: MetricKind::Counter,
            label_names: self.label_names().to_vec(),
            series,
        }
    }
}

impl std::fmt::Debug for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counter")
            .field("name", &self.inner.meta.name)
            .field("series", &self.inner.series.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> Counter {
        Counter::new(
            "requests_total",
            "Requests",
            LabelSchema::new(&["code", "method"]).unwrap(),
        )
    }

    #[test]
    fn increments_accumulate_per_series() {
        let c = counter();
        c.inc(&["200", "GET"]).unwrap();
        c.inc_by(&["200", "GET"], 2.5).unwrap();
        c.inc(&["500", "GET"]).unwrap();

        assert_eq!(c.get(&["200", "GET"]).unwrap(), 3.5);
        assert_eq!(c.get(&["500", "GET"]).unwrap(), 1.0);
        assert_eq!(c.get(&["404", "GET"]).unwrap(), 0.0);
    }

    #[test]
    fn rejects_negative_and_non_finite_deltas() {
        let c = counter();
        for delta in [-1.0, f64::NAN, f64::INFINITY] {
            let err = c.inc_by(&["200", "GET"], delta).unwrap_err();
            assert!(matches!(err, MetricsError::InvalidValue(_)));
        }
        assert_eq!(c.get(&["200", "GET"]).unwrap(), 0.0);
    }

    #[test]
    fn rejects_wrong_label_count() {
        let c = counter();
        let err = c.inc(&["200"]).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidLabelCardinality(_)));
        assert!(c.snapshot().series.is_empty());
    }

    #[test]
    fn snapshot_is_sorted_by_label_values() {
        let c = counter();
        c.inc(&["500", "GET"]).unwrap();
        c.inc(&["200", "POST"]).unwrap();
        c.inc(&["200", "GET"]).unwrap();

        let snap = c.snapshot();
        let keys: Vec<Vec<String>> = snap.series.iter().map(|s| s.label_values.clone()).collect();
        assert_eq!(
            keys,
            vec![
                vec!["200".to_string(), "GET".to_string()],
                vec!["200".to_string(), "POST".to_string()],
                vec!["500".to_string(), "GET".to_string()],
            ]
        );
    }
}
