pub mod timing;

pub use timing::PrometheusMiddleware;
