use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    DuplicateMetric(String),
    InvalidSchema(String),
    InvalidLabelCardinality(String),
    InvalidValue(String),
    MetricNotFound(String),
    KindMismatch(String),
    Configuration(String),
    Delivery(String),
}

impl MetricsError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            MetricsError::DuplicateMetric(_) => "M001",
            MetricsError::InvalidSchema(_) => "M002",
            MetricsError::InvalidLabelCardinality(_) => "M003",
            MetricsError::InvalidValue(_) => "M004",
            MetricsError::MetricNotFound(_) => "M005",
            MetricsError::KindMismatch(_) => "M006",
            MetricsError::Configuration(_) => "M007",
            MetricsError::Delivery(_) => "M008",
        }
    }

    /// Human readable error category
    pub fn error_type(&self) -> &'static str {
        match self {
            MetricsError::DuplicateMetric(_) => "Duplicate Metric",
            MetricsError::InvalidSchema(_) => "Invalid Metric Schema",
            MetricsError::InvalidLabelCardinality(_) => "Invalid Label Cardinality",
            MetricsError::InvalidValue(_) => "Invalid Observation Value",
            MetricsError::MetricNotFound(_) => "Metric Not Found",
            MetricsError::KindMismatch(_) => "Metric Kind Mismatch",
            MetricsError::Configuration(_) => "Configuration Error",
            MetricsError::Delivery(_) => "Push Delivery Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            MetricsError::DuplicateMetric(msg) => msg,
            MetricsError::InvalidSchema(msg) => msg,
            MetricsError::InvalidLabelCardinality(msg) => msg,
            MetricsError::InvalidValue(msg) => msg,
            MetricsError::MetricNotFound(msg) => msg,
            MetricsError::KindMismatch(msg) => msg,
            MetricsError::Configuration(msg) => msg,
            MetricsError::Delivery(msg) => msg,
        }
    }

    /// Configuration-class errors must stop startup; everything else is
    /// either a programming error at the call site or a transient failure.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MetricsError::DuplicateMetric(_)
                | MetricsError::InvalidSchema(_)
                | MetricsError::Configuration(_)
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.format_simple())
    }
}

impl std::error::Error for MetricsError {}

impl MetricsError {
    pub fn duplicate_metric<T: Into<String>>(msg: T) -> Self {
        MetricsError::DuplicateMetric(msg.into())
    }

    pub fn invalid_schema<T: Into<String>>(msg: T) -> Self {
        MetricsError::InvalidSchema(msg.into())
    }

    pub fn invalid_label_cardinality<T: Into<String>>(msg: T) -> Self {
        MetricsError::InvalidLabelCardinality(msg.into())
    }

    pub fn invalid_value<T: Into<String>>(msg: T) -> Self {
        MetricsError::InvalidValue(msg.into())
    }

    pub fn metric_not_found<T: Into<String>>(msg: T) -> Self {
        MetricsError::MetricNotFound(msg.into())
    }

    pub fn kind_mismatch<T: Into<String>>(msg: T) -> Self {
        MetricsError::KindMismatch(msg.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        MetricsError::Configuration(msg.into())
    }

    pub fn delivery<T: Into<String>>(msg: T) -> Self {
        MetricsError::Delivery(msg.into())
    }
}

impl From<config::ConfigError> for MetricsError {
    fn from(err: config::ConfigError) -> Self {
        MetricsError::Configuration(err.to_string())
    }
}

impl From<url::ParseError> for MetricsError {
    fn from(err: url::ParseError) -> Self {
        MetricsError::Configuration(format!("invalid URL: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, MetricsError>;
