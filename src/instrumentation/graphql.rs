//! GraphQL operation hook
//!
//! The host's GraphQL layer calls [`attach_graphql_operation`] once it knows
//! the operation being executed. The middleware records the operation
//! metrics when the request completes.

use actix_web::{HttpMessage, HttpRequest};
use tracing::trace;

use super::request::{GraphqlOperation, OperationKind, SharedRequestMetrics};

/// Attach operation metadata to an instrumented request.
///
/// Returns `false` when the request did not pass through the metrics
/// middleware or an operation was already attached.
pub fn attach_graphql_operation(
    req: &HttpRequest,
    kind: OperationKind,
    name: Option<&str>,
) -> bool {
    let Some(ctx) = req.extensions().get::<SharedRequestMetrics>().cloned() else {
        trace!("request is not instrumented, ignoring graphql operation");
        return false;
    };
    let attached = ctx.borrow_mut().attach(GraphqlOperation::new(kind, name));
    attached
}

/// Operation attached to this request, if any.
pub fn attached_operation(req: &HttpRequest) -> Option<GraphqlOperation> {
    let ctx = req.extensions().get::<SharedRequestMetrics>().cloned()?;
    let op = ctx.borrow().graphql().cloned();
    op
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrumentation::RequestMetrics;
    use actix_web::test::TestRequest;

    #[test]
    fn uninstrumented_request_is_ignored() {
        let req = TestRequest::default().to_http_request();
        assert!(!attach_graphql_operation(&req, OperationKind::Query, Some("Q")));
        assert!(attached_operation(&req).is_none());
    }

    #[test]
    fn attaches_to_instrumented_request() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(RequestMetrics::start().shared());

        assert!(attach_graphql_operation(&req, OperationKind::Query, Some("GetThing")));
        assert!(!attach_graphql_operation(&req, OperationKind::Mutation, None));

        let op = attached_operation(&req).unwrap();
        assert_eq!(op.kind, OperationKind::Query);
        assert_eq!(op.name, "GetThing");
    }
}
