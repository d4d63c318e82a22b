//! Metrics registry
//!
//! Owns every registered instrument. Built once at startup and shared by
//! `Arc`; tests build their own independent registries.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::counter::Counter;
use super::encoder;
use super::gauge::Gauge;
use super::histogram::Histogram;
use super::labels::{LabelSchema, validate_metric_name};
use super::snapshot::{MetricSnapshot, RegistrySnapshot};
use super::types::{MetricDescriptor, MetricKind};
use crate::errors::{MetricsError, Result};

/// Handle to a registered instrument of any kind.
#[derive(Debug, Clone)]
pub enum Instrument {
    Counter(Counter),
    Gauge(Gauge),
    Histogram(Histogram),
}

impl Instrument {
    pub fn kind(&self) -> MetricKind {
        match self {
            Instrument::Counter(_) => MetricKind::Counter,
            Instrument::Gauge(_) => MetricKind::Gauge,
            Instrument::Histogram(_) => MetricKind::Histogram,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Instrument::Counter(c) => c.name(),
            Instrument::Gauge(g) => g.name(),
            Instrument::Histogram(h) => h.name(),
        }
    }

    fn snapshot(&self) -> MetricSnapshot {
        match self {
            Instrument::Counter(c) => c.snapshot(),
            Instrument::Gauge(g) => g.snapshot(),
            Instrument::Histogram(h) => h.snapshot(),
        }
    }
}

type CollectHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct Registry {
    instruments: RwLock<BTreeMap<String, Instrument>>,
    /// Run right before every snapshot, e.g. to refresh uptime gauges.
    collect_hooks: RwLock<Vec<CollectHook>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register an instrument described by `descriptor`.
    ///
    /// Fails with `DuplicateMetric` when the name is taken (the existing
    /// instrument is left untouched) and with `InvalidSchema` for bad names,
    /// labels or bucket bounds.
    pub fn register(&self, descriptor: MetricDescriptor) -> Result<Instrument> {
        validate_metric_name(&descriptor.name)?;
        let schema = LabelSchema::new(descriptor.label_names.as_slice())?;

        let instrument = match (descriptor.kind, descriptor.buckets.as_deref()) {
            (MetricKind::Histogram, Some(bounds)) => Instrument::Histogram(Histogram::new(
                &descriptor.name,
                &descriptor.help,
                schema,
                bounds,
            )?),
            (MetricKind::Histogram, None) => {
                return Err(MetricsError::invalid_schema(format!(
                    "histogram '{}' needs bucket bounds",
                    descriptor.name
                )));
            }
            (kind, Some(_)) => {
                return Err(MetricsError::invalid_schema(format!(
                    "{} '{}' cannot take bucket bounds",
                    kind, descriptor.name
                )));
            }
            (MetricKind::Counter, None) => {
                Instrument::Counter(Counter::new(&descriptor.name, &descriptor.help, schema))
            }
            (MetricKind::Gauge, None) => {
                Instrument::Gauge(Gauge::new(&descriptor.name, &descriptor.help, schema))
            }
        };

        let mut instruments = self.instruments.write();
        if instruments.contains_key(&descriptor.name) {
            return Err(MetricsError::duplicate_metric(format!(
                "metric '{}' is already registered",
                descriptor.name
            )));
        }
        instruments.insert(descriptor.name.clone(), instrument.clone());
        drop(instruments);

        debug!(
            metric = %descriptor.name,
            kind = %descriptor.kind,
            labels = ?descriptor.label_names,
            "registered metric"
        );
        Ok(instrument)
    }

    pub fn register_counter(&self, name: &str, help: &str, labels: &[&str]) -> Result<Counter> {
        match self.register(MetricDescriptor::counter(name, help, labels))? {
            Instrument::Counter(c) => Ok(c),
            other => Err(mismatch(name, MetricKind::Counter, other.kind())),
        }
    }

    pub fn register_gauge(&self, name: &str, help: &str, labels: &[&str]) -> Result<Gauge> {
        match self.register(MetricDescriptor::gauge(name, help, labels))? {
            Instrument::Gauge(g) => Ok(g),
            other => Err(mismatch(name, MetricKind::Gauge, other.kind())),
        }
    }

    pub fn register_histogram(
        &self,
        name: &str,
        help: &str,
        labels: &[&str],
        buckets: &[f64],
    ) -> Result<Histogram> {
        match self.register(MetricDescriptor::histogram(name, help, labels, buckets))? {
            Instrument::Histogram(h) => Ok(h),
            other => Err(mismatch(name, MetricKind::Histogram, other.kind())),
        }
    }

    pub fn get(&self, name: &str) -> Option<Instrument> {
        self.instruments.read().get(name).cloned()
    }

    pub fn counter(&self, name: &str) -> Result<Counter> {
        match self.lookup(name)? {
            Instrument::Counter(c) => Ok(c),
            other => Err(mismatch(name, MetricKind::Counter, other.kind())),
        }
    }

    pub fn gauge(&self, name: &str) -> Result<Gauge> {
        match self.lookup(name)? {
            Instrument::Gauge(g) => Ok(g),
            other => Err(mismatch(name, MetricKind::Gauge, other.kind())),
        }
    }

    pub fn histogram(&self, name: &str) -> Result<Histogram> {
        match self.lookup(name)? {
            Instrument::Histogram(h) => Ok(h),
            other => Err(mismatch(name, MetricKind::Histogram, other.kind())),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.instruments.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.instruments.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.read().is_empty()
    }

    /// Add a hook that runs before every snapshot.
    pub fn add_collect_hook<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.collect_hooks.write().push(Arc::new(hook));
    }

    /// Point-in-time view of every series, sorted by metric name.
    ///
    /// The registry lock only covers cloning the instrument handles; each
    /// series is then read under its own critical section.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let hooks: Vec<CollectHook> = self.collect_hooks.read().clone();
        for hook in hooks {
            hook();
        }

        let instruments: Vec<Instrument> = self.instruments.read().values().cloned().collect();
        RegistrySnapshot {
            metrics: instruments.iter().map(Instrument::snapshot).collect(),
        }
    }

    /// Snapshot and encode in the text exposition format.
    pub fn encode(&self) -> Vec<u8> {
        encoder::encode(&self.snapshot())
    }

    fn lookup(&self, name: &str) -> Result<Instrument> {
        self.get(name).ok_or_else(|| {
            MetricsError::metric_not_found(format!("metric '{}' is not registered", name))
        })
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("metrics", &self.names())
            .finish()
    }
}

fn mismatch(name: &str, wanted: MetricKind, actual: MetricKind) -> MetricsError {
    MetricsError::kind_mismatch(format!(
        "metric '{}' is a {}, not a {}",
        name, actual, wanted
    ))
}
