//! Gauge instrument

use dashmap::DashMap;
use std::sync::Arc;

use super::atomic::AtomicF64;
use super::labels::LabelSchema;
use super::snapshot::{MetricSnapshot, SeriesSnapshot, SeriesValue};
use super::types::{MetricKind, MetricMeta};
use crate::errors::{MetricsError, Result};

struct GaugeInner {
    meta: MetricMeta,
    series: DashMap<Box<[String]>, Arc<AtomicF64>>,
}

/// Label-keyed gauge supporting set, increment and decrement.
#[derive(Clone)]
pub struct Gauge {
    inner: Arc<GaugeInner>,
}

impl Gauge {
    pub(crate) fn new(name: &str, help: &str, schema: LabelSchema) -> Self {
        Self {
            inner: Arc::new(GaugeInner {
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

    pub fn set(&self, label_values: &[&str], value: f64) -> Result<()> {
        let cell = self.cell(label_values, value)?;
        cell.set(value);
        Ok(())
    }

    pub fn inc_by(&self, label_values: &[&str], delta: f64) -> Result<()> {
        let cell = self.cell(label_values, delta)?;
        cell.add(delta);
        Ok(())
    }

    pub fn dec_by(&self, label_values: &[&str], delta: f64) -> Result<()> {
        let cell = self.cell(label_values, delta)?;
        cell.add(-delta);
        Ok(())
    }

    pub fn inc(&self, label_values: &[&str]) -> Result<()> {
        self.inc_by(label_values, 1.0)
    }

    pub fn dec(&self, label_values: &[&str]) -> Result<()> {
        self.dec_by(label_values, 1.0)
    }

    /// Current value of a series, `0` if it was never touched.
    pub fn get(&self, label_values: &[&str]) -> Result<f64> {
        let key = self.inner.meta.schema.series_key(self.name(), label_values)?;
        Ok(self
            .inner
            .series
            .get(&key)
            .map(|cell| cell.get())
            .unwrap_or(0.0))
    }

    fn cell(&self, label_values: &[&str], value: f64) -> Result<Arc<AtomicF64>> {
        if value.is_nan() {
            return Err(MetricsError::invalid_value(format!(
                "gauge '{}' cannot take NaN",
                self.name()
            )));
        }
        let key = self.inner.meta.schema.series_key(self.name(), label_values)?;
        if let Some(cell) = self.inner.series.get(&key) {
            return Ok(Arc::clone(cell.value()));
        }
        Ok(self
            .inner
            .series
            .entry(key)
            .or_insert_with(|| Arc::new(AtomicF64::default()))
            .value()
            .clone())
    }

    pub(crate) fn snapshot(&self) -> MetricSnapshot {
        let mut series: Vec<SeriesSnapshot> = self
            .inner
            .series
            .iter()
            .map(|entry| SeriesSnapshot {
                label_values: entry.key().to_vec(),
                value: SeriesValue::Gauge(entry.value().get()),
            })
            .collect();
        series.sort_by(|a, b| a.label_values.cmp(&b.label_values));

        MetricSnapshot {
            name: self.inner.meta.name.clone(),
            help: self.inner.meta.help.clone(),
            kind: MetricKind::Gauge,
            label_names: self.label_names().to_vec(),
            series,
        }
    }
}

impl std::fmt::Debug for Gauge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gauge")
            .field("name", &self.inner.meta.name)
            .field("series", &self.inner.series.len())
            .finish()
    }
}
