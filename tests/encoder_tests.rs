//! Exposition format tests

use promrelay::metrics::encoder::{encode_to_string, format_value};
use promrelay::metrics::{CONTENT_TYPE, Registry, encode};

#[test]
fn test_counter_output() {
    let registry = Registry::new();
    let counter = registry
        .register_counter("http_requests_total", "Total requests", &["code", "method"])
        .unwrap();
    for _ in 0..3 {
        counter.inc(&["200", "GET"]).unwrap();
    }
    counter.inc(&["500", "GET"]).unwrap();

    assert_eq!(
        encode_to_string(&registry.snapshot()),
        "# HELP http_requests_total Total requests\n\
         # TYPE http_requests_total counter\n\
         http_requests_total{code=\"200\",method=\"GET\"} 3\n\
         http_requests_total{code=\"500\",method=\"GET\"} 1\n"
    );
}

#[test]
fn test_histogram_output() {
    let registry = Registry::new();
    let h = registry
        .register_histogram("latency_ms", "Latency", &["route"], &[5.0, 15.0])
        .unwrap();
    h.observe(&["/a"], 7.0).unwrap();

    assert_eq!(
        encode_to_string(&registry.snapshot()),
        "# HELP latency_ms Latency\n\
         # TYPE latency_ms histogram\n\
         latency_ms_bucket{route=\"/a\",le=\"5\"} 0\n\
         latency_ms_bucket{route=\"/a\",le=\"15\"} 1\n\
         latency_ms_bucket{route=\"/a\",le=\"+Inf\"} 1\n\
         latency_ms_sum{route=\"/a\"} 7\n\
         latency_ms_count{route=\"/a\"} 1\n"
    );
}

#[test]
fn test_unlabelled_metrics_have_no_braces() {
    let registry = Registry::new();
    let gauge = registry
        .register_gauge("websocket_connections_active", "Active", &[])
        .unwrap();
    gauge.set(&[], 2.0).unwrap();
    let h = registry
        .register_histogram("work_ms", "Work", &[], &[0.1])
        .unwrap();
    h.observe(&[], 0.05).unwrap();

    let text = encode_to_string(&registry.snapshot());
    assert!(text.contains("\nwebsocket_connections_active 2\n"));
    assert!(text.contains("\nwork_ms_bucket{le=\"0.1\"} 1\n"));
    assert!(text.contains("\nwork_ms_sum 0.05\n"));
    assert!(text.contains("\nwork_ms_count 1\n"));
}

#[test]
fn test_metrics_sorted_by_name() {
    let registry = Registry::new();
    registry.register_gauge("zeta", "Z", &[]).unwrap();
    registry.register_gauge("alpha", "A", &[]).unwrap();
    registry.register_gauge("mid", "M", &[]).unwrap();

    let text = encode_to_string(&registry.snapshot());
    let alpha = text.find("# HELP alpha").unwrap();
    let mid = text.find("# HELP mid").unwrap();
    let zeta = text.find("# HELP zeta").unwrap();
    assert!(alpha < mid && mid < zeta);
}

#[test]
fn test_registered_metric_without_series() {
    let registry = Registry::new();
    registry.register_counter("idle_total", "Idle", &["x"]).unwrap();

    assert_eq!(
        encode_to_string(&registry.snapshot()),
        "# HELP idle_total Idle\n# TYPE idle_total counter\n"
    );
}

#[test]
fn test_escaping() {
    let registry = Registry::new();
    let counter = registry
        .register_counter("odd_total", "Line one\nback\\slash", &["path"])
        .unwrap();
    counter.inc(&["say \"hi\"\n"]).unwrap();

    let text = encode_to_string(&registry.snapshot());
    assert!(text.contains("# HELP odd_total Line one\\nback\\\\slash\n"));
    assert!(text.contains("odd_total{path=\"say \\\"hi\\\"\\n\"} 1\n"));
}

#[test]
fn test_same_snapshot_same_bytes() {
    let registry = Registry::new();
    let counter = registry.register_counter("c_total", "C", &["k"]).unwrap();
    for key in ["b", "a", "c", "a"] {
        counter.inc(&[key]).unwrap();
    }

    let snap = registry.snapshot();
    assert_eq!(encode(&snap), encode(&snap));
    assert_eq!(encode(&snap), registry.encode());
}

#[test]
fn test_number_formatting() {
    assert_eq!(format_value(7.0), "7");
    assert_eq!(format_value(0.1), "0.1");
    assert_eq!(format_value(2.5), "2.5");
    assert_eq!(format_value(f64::INFINITY), "+Inf");
    assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
    assert_eq!(format_value(f64::NAN), "NaN");
}

#[test]
fn test_content_type() {
    assert_eq!(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8");
}
