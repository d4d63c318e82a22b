//! Metric and label naming rules
//!
//! A metric's label names are fixed when it is registered. Observations pass
//! label values positionally, in schema order.

use std::sync::Arc;

use crate::errors::{MetricsError, Result};

/// Label name reserved for histogram bucket bounds.
pub const BUCKET_LABEL: &str = "le";

/// Ordered label names of one metric.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelSchema {
    names: Arc<[String]>,
}

impl LabelSchema {
    /// Build a schema, rejecting invalid or repeated label names.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut owned: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            validate_label_name(name)?;
            if owned.iter().any(|n| n == name) {
                return Err(MetricsError::invalid_schema(format!(
                    "label name '{}' appears more than once",
                    name
                )));
            }
            owned.push(name.to_string());
        }
        Ok(Self {
            names: owned.into(),
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Check the number of label values given for one observation and
    /// turn them into the owned series key.
    pub(crate) fn series_key(&self, metric: &str, values: &[&str]) -> Result<Box<[String]>> {
        if values.len() != self.names.len() {
            return Err(MetricsError::invalid_label_cardinality(format!(
                "metric '{}' expects {} label values ({}), got {}",
                metric,
                self.names.len(),
                self.names.join(", "),
                values.len()
            )));
        }
        Ok(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Metric names follow `[a-zA-Z_:][a-zA-Z0-9_:]*`.
pub fn validate_metric_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == ':' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(MetricsError::invalid_schema(format!(
            "invalid metric name '{}'",
            name
        )))
    }
}

/// Label names follow `[a-zA-Z_][a-zA-Z0-9_]*`; the `__` prefix is reserved.
pub fn validate_label_name(name: &str) -> Result<()> {
    if name.starts_with("__") {
        return Err(MetricsError::invalid_schema(format!(
            "label name '{}' uses the reserved '__' prefix",
            name
        )));
    }

    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(MetricsError::invalid_schema(format!(
            "invalid label name '{}'",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_metric_names() {
        assert!(validate_metric_name("http_requests_total").is_ok());
        assert!(validate_metric_name("job:rate5m").is_ok());
        assert!(validate_metric_name("_hidden").is_ok());
    }

    #[test]
    fn rejects_invalid_metric_names() {
        assert!(validate_metric_name("").is_err());
        assert!(validate_metric_name("1st").is_err());
        assert!(validate_metric_name("with-dash").is_err());
        assert!(validate_metric_name("spaced name").is_err());
    }

    #[test]
    fn rejects_reserved_and_repeated_labels() {
        assert!(matches!(
            LabelSchema::new(&["__name__"]),
            Err(MetricsError::InvalidSchema(_))
        ));
        assert!(matches!(
            LabelSchema::new(&["code", "code"]),
            Err(MetricsError::InvalidSchema(_))
        ));
        assert!(LabelSchema::new(&["job:x"]).is_err());
    }

    #[test]
    fn series_key_checks_cardinality() {
        let schema = LabelSchema::new(&["code", "method"]).unwrap();
        let key = schema.series_key("m", &["200", "GET"]).unwrap();
        assert_eq!(&*key, &["200".to_string(), "GET".to_string()]);

        let err = schema.series_key("m", &["200"]).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidLabelCardinality(_)));
        assert!(err.message().contains("code, method"));
    }
}
