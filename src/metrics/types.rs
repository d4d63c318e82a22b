use strum::Display;

/// Instrument kind, rendered as the exposition `# TYPE` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

/// Everything needed to register one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    pub name: String,
    pub kind: MetricKind,
    pub help: String,
    pub label_names: Vec<String>,
    /// Bucket upper bounds, histograms only.
    pub buckets: Option<Vec<f64>>,
}

impl MetricDescriptor {
    pub fn counter(name: &str, help: &str, labels: &[&str]) -> Self {
        Self::new(name, MetricKind::Counter, help, labels, None)
    }

    pub fn gauge(name: &str, help: &str, labels: &[&str]) -> Self {
        Self::new(name, MetricKind::Gauge, help, labels, None)
    }

    pub fn histogram(name: &str, help: &str, labels: &[&str], buckets: &[f64]) -> Self {
        Self::new(
            name,
            MetricKind::Histogram,
            help,
            labels,
            Some(buckets.to_vec()),
        )
    }

    fn new(
        name: &str,
        kind: MetricKind,
        help: &str,
        labels: &[&str],
        buckets: Option<Vec<f64>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            help: help.to_string(),
            label_names: labels.iter().map(|l| l.to_string()).collect(),
            buckets,
        }
    }
}

/// Name, help text and label schema shared by every instrument kind.
#[derive(Debug)]
pub(crate) struct MetricMeta {
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) schema: super::labels::LabelSchema,
}

impl MetricMeta {
    pub(crate) fn new(name: &str, help: &str, schema: super::labels::LabelSchema) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            schema,
        }
    }
}
