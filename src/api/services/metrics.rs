//! Prometheus scrape endpoint
//!
//! Serves the registry in text exposition format at the configured mount
//! path. Not registered at all when no mount path is configured.

use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;
use tracing::debug;

use crate::metrics::{CONTENT_TYPE, Registry};

/// Metrics service handler
pub struct MetricsService;

impl MetricsService {
    /// Handle a scrape. Always succeeds.
    pub async fn metrics(registry: web::Data<Registry>) -> impl Responder {
        HttpResponse::Ok()
            .content_type(CONTENT_TYPE)
            .body(registry.encode())
    }
}

/// Register `GET <mount_path>` when a mount path is set.
///
/// Returns whether the route was registered.
pub fn configure_metrics_route(
    cfg: &mut web::ServiceConfig,
    mount_path: Option<&str>,
    registry: Arc<Registry>,
) -> bool {
    let Some(path) = mount_path else {
        return false;
    };

    cfg.service(
        web::resource(path)
            .app_data(web::Data::from(registry))
            .route(web::get().to(MetricsService::metrics)),
    );
    debug!(path = %path, "metrics endpoint mounted");
    true
}
