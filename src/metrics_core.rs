//! Core metrics traits
//!
//! Provides the `MetricsRecorder` trait and `NoopMetrics` so adapters can
//! accept `Arc<dyn MetricsRecorder>` and tests can run without a registry.

use std::sync::Arc;

/// Trait for recording plugin metrics.
///
/// All methods are no-op by default, allowing partial implementation.
/// Implementations must be thread-safe (Send + Sync).
#[allow(unused_variables)]
pub trait MetricsRecorder: Send + Sync {
    // ===== HTTP (timing middleware) =====

    /// Record a finished HTTP request
    fn inc_http_request(&self, code: &str, method: &str) {}

    /// Observe HTTP request duration in milliseconds
    fn observe_http_request(&self, method: &str, route: &str, duration_ms: f64) {}

    // ===== GraphQL =====

    /// Record an executed GraphQL operation
    fn inc_graphql_operation(&self, operation_type: &str, operation_name: &str) {}

    /// Observe GraphQL operation duration in milliseconds
    fn observe_graphql_operation(&self, operation_type: &str, operation_name: &str, duration_ms: f64) {
    }

    // ===== Websocket =====

    /// A new websocket connection was tracked
    fn inc_websocket_connections(&self) {}

    /// A tracked websocket connection went away
    fn dec_websocket_connections(&self) {}
}

/// Noop metrics implementation for testing.
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {}

impl NoopMetrics {
    pub fn new() -> Self {
        Self
    }

    pub fn arc() -> Arc<dyn MetricsRecorder> {
        Arc::new(Self::new())
    }
}

impl Default for NoopMetrics {
    fn default() -> Self {
        Self::new()
    }
}
