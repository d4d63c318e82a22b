//! Point-in-time registry views
//!
//! Snapshots own their data, so encoding runs without touching live
//! instrument state.

use super::types::MetricKind;

/// All metrics of a registry, sorted by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegistrySnapshot {
    pub metrics: Vec<MetricSnapshot>,
}

impl RegistrySnapshot {
    pub fn get(&self, name: &str) -> Option<&MetricSnapshot> {
        self.metrics
            .binary_search_by(|m| m.name.as_str().cmp(name))
            .ok()
            .map(|idx| &self.metrics[idx])
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// One metric with all of its series, sorted by label values.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSnapshot {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Vec<String>,
    pub series: Vec<SeriesSnapshot>,
}

impl MetricSnapshot {
    /// Look up the series with exactly these label values.
    pub fn series(&self, label_values: &[&str]) -> Option<&SeriesValue> {
        self.series
            .iter()
            .find(|s| {
                s.label_values.len() == label_values.len()
                    && s.label_values.iter().zip(label_values).all(|(a, b)| a == b)
            })
            .map(|s| &s.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    pub label_values: Vec<String>,
    pub value: SeriesValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValue {
    Counter(f64),
    Gauge(f64),
    Histogram(HistogramValue),
}

impl SeriesValue {
    /// Scalar value of a counter or gauge series.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SeriesValue::Counter(v) | SeriesValue::Gauge(v) => Some(*v),
            SeriesValue::Histogram(_) => None,
        }
    }

    pub fn as_histogram(&self) -> Option<&HistogramValue> {
        match self {
            SeriesValue::Histogram(h) => Some(h),
            _ => None,
        }
    }
}

/// Cumulative histogram state of one series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistogramValue {
    /// `(upper bound, observations <= bound)` in ascending bound order.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    pub count: u64,
}

impl HistogramValue {
    /// Cumulative count of the bucket with exactly this bound.
    pub fn bucket(&self, bound: f64) -> Option<u64> {
        self.buckets
            .iter()
            .find(|(b, _)| *b == bound)
            .map(|(_, count)| *count)
    }
}
