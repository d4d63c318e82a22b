//! HTTP metrics middleware
//!
//! Records `http_requests_total{code, method}` and
//! `http_request_duration_ms{method, route}` exactly once per request, plus
//! the GraphQL operation metrics when a resolver attached an operation.

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use crate::api::constants::{OTHER_METHOD, UNMATCHED_ROUTE};
use crate::instrumentation::{RequestMetrics, SharedRequestMetrics};
use crate::metrics_core::MetricsRecorder;

/// Records the request once, either when the inner service finishes or,
/// if the future is dropped first, with a 500 from `drop`.
///
/// Holds no `HttpRequest`: actix must be the sole owner of the request
/// while it routes.
struct CompletionGuard {
    metrics: Arc<dyn MetricsRecorder>,
    context: SharedRequestMetrics,
    method: &'static str,
    route: String,
    started: Instant,
    recorded: bool,
}

impl CompletionGuard {
    fn finish(&mut self, status: StatusCode, with_graphql: bool) {
        if self.recorded {
            return;
        }
        self.recorded = true;

        let duration_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.metrics.inc_http_request(status.as_str(), self.method);
        self.metrics
            .observe_http_request(self.method, &self.route, duration_ms);

        if !with_graphql {
            return;
        }
        let operation = self.context.borrow().graphql().cloned();
        if let Some(op) = operation {
            self.metrics
                .inc_graphql_operation(op.kind.as_ref(), &op.name);
            self.metrics
                .observe_graphql_operation(op.kind.as_ref(), &op.name, duration_ms);
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.finish(StatusCode::INTERNAL_SERVER_ERROR, false);
    }
}

/// HTTP metrics middleware factory
#[derive(Clone)]
pub struct PrometheusMiddleware {
    metrics: Arc<dyn MetricsRecorder>,
}

impl PrometheusMiddleware {
    pub fn new(metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self { metrics }
    }
}

impl<S, B> Transform<S, ServiceRequest> for PrometheusMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = PrometheusService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(PrometheusService {
            service: Rc::new(service),
            metrics: self.metrics.clone(),
        }))
    }
}

pub struct PrometheusService<S> {
    service: Rc<S>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<S, B> Service<ServiceRequest> for PrometheusService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let started = Instant::now();

        let context = RequestMetrics::started_at(started).shared();
        req.extensions_mut().insert(Rc::clone(&context));

        // resolved from the app's resource map, so it is known before routing
        let route = req
            .match_pattern()
            .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

        let mut guard = CompletionGuard {
            metrics: self.metrics.clone(),
            context,
            method: method_str(req.method()),
            route,
            started,
            recorded: false,
        };

        Box::pin(async move {
            let result = srv.call(req).await;

            let status = match &result {
                Ok(response) => {
                    if let Some(pattern) = response.request().match_pattern() {
                        guard.route = pattern;
                    }
                    response.status()
                }
                Err(e) => e.as_response_error().status_code(),
            };
            guard.finish(status, true);

            result
        })
    }
}

/// Map HTTP method to a static string (avoids allocation).
fn method_str(method: &actix_web::http::Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        "PATCH" => "PATCH",
        _ => OTHER_METHOD,
    }
}
