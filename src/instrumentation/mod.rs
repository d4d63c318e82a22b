//! Host-facing instrumentation
//!
//! - `request`: per-request metrics context stored in request extensions
//! - `graphql`: resolver hook attaching operation metadata to a request
//! - `websocket`: connection tracking behind the active-connections gauge
//!
//! The HTTP lifecycle itself is handled by
//! [`PrometheusMiddleware`](crate::api::middleware::PrometheusMiddleware).

pub mod graphql;
pub mod request;
pub mod websocket;

pub use graphql::{attach_graphql_operation, attached_operation};
pub use request::{GraphqlOperation, OperationKind, RequestMetrics, SharedRequestMetrics};
pub use websocket::{ConnectionId, WebsocketTracker};
