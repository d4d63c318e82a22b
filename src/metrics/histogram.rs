//! Histogram instrument
//!
//! Bucket counts are stored cumulatively: an observation increments every
//! bucket whose upper bound is >= the observed value. Counts, sum and total
//! of one series change together under that series' mutex, so snapshots
//! never see a bucket increment without its matching sum.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

use super::labels::{BUCKET_LABEL, LabelSchema};
use super::snapshot::{HistogramValue, MetricSnapshot, SeriesSnapshot, SeriesValue};
use super::types::{MetricKind, MetricMeta};
use crate::errors::{MetricsError, Result};

/// Default latency buckets, in milliseconds.
pub const DEFAULT_DURATION_BUCKETS_MS: [f64; 6] = [0.1, 5.0, 15.0, 50.0, 100.0, 500.0];

#[derive(Debug)]
struct HistogramSeries {
    counts: Vec<u64>,
    sum: f64,
    count: u64,
}

struct HistogramInner {
    meta: MetricMeta,
    bounds: Arc<[f64]>,
    series: DashMap<Box<[String]>, Arc<Mutex<HistogramSeries>>>,
}

#[derive(Clone)]
pub struct Histogram {
    inner: Arc<HistogramInner>,
}

/// Bounds must be non-empty, finite and strictly ascending.
pub fn validate_buckets(name: &str, bounds: &[f64]) -> Result<()> {
    if bounds.is_empty() {
        return Err(MetricsError::invalid_schema(format!(
            "histogram '{}' needs at least one bucket",
            name
        )));
    }
    if let Some(bad) = bounds.iter().find(|b| !b.is_finite()) {
        return Err(MetricsError::invalid_schema(format!(
            "histogram '{}' has non-finite bucket bound {} (+Inf is implicit)",
            name, bad
        )));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(MetricsError::invalid_schema(format!(
            "histogram '{}' bucket bounds must be strictly ascending: {:?}",
            name, bounds
        )));
    }
    Ok(())
}

impl Histogram {
    pub(crate) fn new(
        name: &str,
        help: &str,
        schema: LabelSchema,
        bounds: &[f64],
    ) -> Result<Self> {
        validate_buckets(name, bounds)?;
        if schema.contains(BUCKET_LABEL) {
            return Err(MetricsError::invalid_schema(format!(
                "histogram '{}' cannot use the reserved label '{}'",
                name, BUCKET_LABEL
            )));
        }

        Ok(Self {
            inner: Arc::new(HistogramInner {
                meta: MetricMeta::new(name, help, schema),
                bounds: bounds.into(),
                series: DashMap::new(),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.meta.name
    }

    pub fn label_names(&self) -> &[String] {
        self.inner.meta.schema.names()
    }

    pub fn bounds(&self) -> &[f64] {
        &self.inner.bounds
    }

    /// Record one observation.
    pub fn observe(&self, label_values: &[&str], value: f64) -> Result<()> {
        if value.is_nan() {
            return Err(MetricsError::invalid_value(format!(
                "histogram '{}' cannot observe NaN",
                self.name()
            )));
        }
        let key = self.inner.meta.schema.series_key(self.name(), label_values)?;
        let series = self.series(key);

        // first bucket whose bound is >= value; every later bucket counts too
        let first = self.inner.bounds.partition_point(|bound| *bound < value);

        let mut state = series.lock();
        for count in &mut state.counts[first..] {
            *count += 1;
        }
        state.sum += value;
        state.count += 1;
        Ok(())
    }

    /// Current state of a series, empty if it was never observed.
    pub fn get(&self, label_values: &[&str]) -> Result<HistogramValue> {
        let key = self.inner.meta.schema.series_key(self.name(), label_values)?;
        let series = self.inner.series.get(&key).map(|s| Arc::clone(s.value()));
        Ok(match series {
            Some(series) => self.read(&series.lock()),
            None => self.read(&self.empty_series()),
        })
    }

    fn series(&self, key: Box<[String]>) -> Arc<Mutex<HistogramSeries>> {
        if let Some(series) = self.inner.series.get(&key) {
            return Arc::clone(series.value());
        }
        self.inner
            .series
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(self.empty_series())))
            .value()
            .clone()
    }

    fn empty_series(&self) -> HistogramSeries {
        HistogramSeries {
            counts: vec![0; self.inner.bounds.len()],
            sum: 0.0,
            count: 0,
        }
    }

    fn read(&self, state: &HistogramSeries) -> HistogramValue {
        HistogramValue {
            buckets: self
                .inner
                .bounds
                .iter()
                .copied()
                .zip(state.counts.iter().copied())
                .collect(),
            sum: state.sum,
            count: state.count,
        }
    }

    pub(crate) fn snapshot(&self) -> MetricSnapshot {
        // clone the handles first so no shard lock is held while reading
        let handles: Vec<(Vec<String>, Arc<Mutex<HistogramSeries>>)> = self
            .inner
            .series
            .iter()
            .map(|entry| (entry.key().to_vec(), entry.value().clone()))
            .collect();

        let mut series: Vec<SeriesSnapshot> = handles
            .into_iter()
            .map(|(label_values, state)| SeriesSnapshot {
                label_values,
                value: SeriesValue::Histogram(self.read(&state.lock())),
            })
            .collect();
        series.sort_by(|a, b| a.label_values.cmp(&b.label_values));

        MetricSnapshot {
            name: self.inner.meta.name.clone(),
            help: self.inner.meta.help.clone(),
            kind: MetricKind::Histogram,
            label_names: self.label_names().to_vec(),
            series,
        }
    }
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("name", &self.inner.meta.name)
            .field("bounds", &self.inner.bounds)
            .field("series", &self.inner.series.len())
            .finish()
    }
}
