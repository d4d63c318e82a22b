//! The plugin's fixed instrument set
//!
//! Registered once at startup. Adapters record through the
//! `MetricsRecorder` implementation below.

use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use super::counter::Counter;
use super::gauge::Gauge;
use super::histogram::{DEFAULT_DURATION_BUCKETS_MS, Histogram};
use super::registry::Registry;
use crate::errors::Result;
use crate::metrics_core::MetricsRecorder;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_MS: &str = "http_request_duration_ms";
pub const GRAPHQL_OPERATIONS_TOTAL: &str = "graphql_operations_total";
pub const GRAPHQL_OPERATION_DURATION_MS: &str = "graphql_operation_duration_ms";
pub const WEBSOCKET_CONNECTIONS_ACTIVE: &str = "websocket_connections_active";
pub const PROCESS_START_TIME_SECONDS: &str = "process_start_time_seconds";
pub const PROCESS_UPTIME_SECONDS: &str = "process_uptime_seconds";

/// Typed handles to every standard instrument
#[derive(Debug, Clone)]
pub struct PluginMetrics {
    pub http_requests_total: Counter,
    pub http_request_duration_ms: Histogram,
    pub graphql_operations_total: Counter,
    pub graphql_operation_duration_ms: Histogram,
    pub websocket_connections_active: Gauge,
    pub process_start_time_seconds: Gauge,
    pub process_uptime_seconds: Gauge,
    started_at: Instant,
}

impl PluginMetrics {
    /// Register the standard set into `registry`.
    ///
    /// Fails with `DuplicateMetric` if any of the names is already taken.
    pub fn register(registry: &Registry) -> Result<Arc<Self>> {
        let http_requests_total = registry.register_counter(
            HTTP_REQUESTS_TOTAL,
            "Total number of HTTP requests by status code and method",
            &["code", "method"],
        )?;
        let http_request_duration_ms = registry.register_histogram(
            HTTP_REQUEST_DURATION_MS,
            "HTTP request duration in milliseconds by method and route",
            &["method", "route"],
            &DEFAULT_DURATION_BUCKETS_MS,
        )?;
        let graphql_operations_total = registry.register_counter(
            GRAPHQL_OPERATIONS_TOTAL,
            "Total number of executed GraphQL operations by type and name",
            &["operation_type", "operation_name"],
        )?;
        let graphql_operation_duration_ms = registry.register_histogram(
            GRAPHQL_OPERATION_DURATION_MS,
            "GraphQL operation duration in milliseconds by type and name",
            &["operation_type", "operation_name"],
            &DEFAULT_DURATION_BUCKETS_MS,
        )?;
        let websocket_connections_active = registry.register_gauge(
            WEBSOCKET_CONNECTIONS_ACTIVE,
            "Number of currently connected websocket clients",
            &[],
        )?;
        let process_start_time_seconds = registry.register_gauge(
            PROCESS_START_TIME_SECONDS,
            "Start time of the process since unix epoch in seconds",
            &[],
        )?;
        let process_uptime_seconds = registry.register_gauge(
            PROCESS_UPTIME_SECONDS,
            "Seconds since the metrics plugin started",
            &[],
        )?;

        let start_epoch = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
        process_start_time_seconds.set(&[], start_epoch)?;

        let metrics = Arc::new(Self {
            http_requests_total,
            http_request_duration_ms,
            graphql_operations_total,
            graphql_operation_duration_ms,
            websocket_connections_active,
            process_start_time_seconds,
            process_uptime_seconds,
            started_at: Instant::now(),
        });

        let hook_metrics = metrics.clone();
        registry.add_collect_hook(move || hook_metrics.refresh_process());

        Ok(metrics)
    }

    /// Update uptime; runs before every snapshot.
    pub fn refresh_process(&self) {
        let uptime = self.started_at.elapsed().as_secs_f64();
        check(
            PROCESS_UPTIME_SECONDS,
            self.process_uptime_seconds.set(&[], uptime.floor()),
        );
    }
}

/// Observation errors here mean the adapter passed the wrong labels.
fn check(metric: &str, result: Result<()>) {
    if let Err(e) = &result {
        error!(metric = %metric, error = %e, "metric observation rejected");
    }
    debug_assert!(result.is_ok(), "{} rejected an observation", metric);
}

impl MetricsRecorder for PluginMetrics {
    fn inc_http_request(&self, code: &str, method: &str) {
        check(
            HTTP_REQUESTS_TOTAL,
            self.http_requests_total.inc(&[code, method]),
        );
    }

    fn observe_http_request(&self, method: &str, route: &str, duration_ms: f64) {
        check(
            HTTP_REQUEST_DURATION_MS,
            self.http_request_duration_ms
                .observe(&[method, route], duration_ms),
        );
    }

    fn inc_graphql_operation(&self, operation_type: &str, operation_name: &str) {
        check(
            GRAPHQL_OPERATIONS_TOTAL,
            self.graphql_operations_total
                .inc(&[operation_type, operation_name]),
        );
    }

    fn observe_graphql_operation(&self, operation_type: &str, operation_name: &str, duration_ms: f64) {
        check(
            GRAPHQL_OPERATION_DURATION_MS,
            self.graphql_operation_duration_ms
                .observe(&[operation_type, operation_name], duration_ms),
        );
    }

    fn inc_websocket_connections(&self) {
        check(
            WEBSOCKET_CONNECTIONS_ACTIVE,
            self.websocket_connections_active.inc(&[]),
        );
    }

    fn dec_websocket_connections(&self) {
        check(
            WEBSOCKET_CONNECTIONS_ACTIVE,
            self.websocket_connections_active.dec(&[]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MetricsError;

    #[test]
    fn registers_every_standard_metric() {
        let registry = Registry::new();
        PluginMetrics::register(&registry).unwrap();

        for name in [
            HTTP_REQUESTS_TOTAL,
            HTTP_REQUEST_DURATION_MS,
            GRAPHQL_OPERATIONS_TOTAL,
            GRAPHQL_OPERATION_DURATION_MS,
            WEBSOCKET_CONNECTIONS_ACTIVE,
            PROCESS_START_TIME_SECONDS,
            PROCESS_UPTIME_SECONDS,
        ] {
            assert!(registry.get(name).is_some(), "{} missing", name);
        }
    }

    #[test]
    fn second_registration_is_rejected() {
        let registry = Registry::new();
        PluginMetrics::register(&registry).unwrap();
        assert!(matches!(
            PluginMetrics::register(&registry),
            Err(MetricsError::DuplicateMetric(_))
        ));
    }

    #[test]
    fn recorder_updates_handles() {
        let registry = Registry::new();
        let metrics = PluginMetrics::register(&registry).unwrap();

        metrics.inc_http_request("200", "GET");
        metrics.observe_http_request("GET", "/users/{id}", 12.0);
        metrics.inc_websocket_connections();

        assert_eq!(metrics.http_requests_total.get(&["200", "GET"]).unwrap(), 1.0);
        let h = metrics
            .http_request_duration_ms
            .get(&["GET", "/users/{id}"])
            .unwrap();
        assert_eq!(h.count, 1);
        assert_eq!(h.bucket(15.0), Some(1));
        assert_eq!(metrics.websocket_connections_active.get(&[]).unwrap(), 1.0);
    }

    #[test]
    fn start_time_is_set() {
        let registry = Registry::new();
        let metrics = PluginMetrics::register(&registry).unwrap();
        assert!(metrics.process_start_time_seconds.get(&[]).unwrap() > 1_600_000_000.0);
    }
}
