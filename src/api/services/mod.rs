pub mod metrics;

pub use metrics::{MetricsService, configure_metrics_route};
