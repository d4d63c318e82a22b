//! Prometheus text exposition format (version 0.0.4)
//!
//! Output is fully determined by the snapshot: metrics come sorted by name,
//! series by label values, and numbers use a fixed formatting that does not
//! depend on locale.

use std::fmt::Write;
use tracing::error;

use super::snapshot::{HistogramValue, MetricSnapshot, RegistrySnapshot, SeriesValue};

/// Content type of the encoded payload.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Encode a snapshot as exposition text.
pub fn encode(snapshot: &RegistrySnapshot) -> Vec<u8> {
    encode_to_string(snapshot).into_bytes()
}

pub fn encode_to_string(snapshot: &RegistrySnapshot) -> String {
    let mut out = String::new();
    for metric in &snapshot.metrics {
        write_metric(&mut out, metric);
    }
    out
}

fn write_metric(out: &mut String, metric: &MetricSnapshot) {
    let name = &metric.name;
    // writing into a String cannot fail
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(&metric.help));
    let _ = writeln!(out, "# TYPE {} {}", name, metric.kind);

    for series in &metric.series {
        debug_assert_eq!(
            series.label_values.len(),
            metric.label_names.len(),
            "series of '{}' has mismatched label values",
            name
        );
        if series.label_values.len() != metric.label_names.len() {
            error!(
                metric = %name,
                "skipping series with mismatched label values during encoding"
            );
            continue;
        }

        let pairs: Vec<(&str, &str)> = metric
            .label_names
            .iter()
            .map(String::as_str)
            .zip(series.label_values.iter().map(String::as_str))
            .collect();

        match &series.value {
            SeriesValue::Counter(v) | SeriesValue::Gauge(v) => {
                let _ = writeln!(
                    out,
                    "{}{} {}",
                    name,
                    label_block(&pairs, None),
                    format_value(*v)
                );
            }
            SeriesValue::Histogram(h) => write_histogram(out, name, &pairs, h),
        }
    }
}

fn write_histogram(out: &mut String, name: &str, pairs: &[(&str, &str)], h: &HistogramValue) {
    for (bound, count) in &h.buckets {
        let le = format_value(*bound);
        let _ = writeln!(
            out,
            "{}_bucket{} {}",
            name,
            label_block(pairs, Some(&le)),
            count
        );
    }
    let _ = writeln!(
        out,
        "{}_bucket{} {}",
        name,
        label_block(pairs, Some("+Inf")),
        h.count
    );
    let _ = writeln!(
        out,
        "{}_sum{} {}",
        name,
        label_block(pairs, None),
        format_value(h.sum)
    );
    let _ = writeln!(out, "{}_count{} {}", name, label_block(pairs, None), h.count);
}

/// `{a="x",b="y"}`, or nothing at all when there are no labels.
fn label_block(pairs: &[(&str, &str)], le: Option<&str>) -> String {
    if pairs.is_empty() && le.is_none() {
        return String::new();
    }

    let mut parts: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect();
    if let Some(le) = le {
        parts.push(format!("le=\"{}\"", le));
    }
    format!("{{{}}}", parts.join(","))
}

/// Integral values print without a fraction; everything else uses the
/// shortest decimal that round-trips.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else if v == 0.0 {
        "0".to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

fn escape_help(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}
