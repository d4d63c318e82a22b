use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Instant;
use strum::AsRefStr;

/// GraphQL operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// Case-insensitive parse of `query`, `mutation` or `subscription`.
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl FromStr for OperationKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "query" => Ok(Self::Query),
            "mutation" => Ok(Self::Mutation),
            "subscription" => Ok(Self::Subscription),
            _ => Err(format!(
                "Invalid operation type: '{}'. Valid: query, mutation, subscription",
                s
            )),
        }
    }
}

/// Operation metadata attached by the GraphQL resolver hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphqlOperation {
    pub kind: OperationKind,
    /// Empty for anonymous operations.
    pub name: String,
}

impl GraphqlOperation {
    pub fn new(kind: OperationKind, name: Option<&str>) -> Self {
        Self {
            kind,
            name: name.unwrap_or_default().to_string(),
        }
    }
}

/// Per-request context inserted by the HTTP middleware.
///
/// Its presence in the request extensions, as a [`SharedRequestMetrics`],
/// marks the request as instrumented.
#[derive(Debug, Clone)]
pub struct RequestMetrics {
    started_at: Instant,
    graphql: Option<GraphqlOperation>,
}

impl RequestMetrics {
    pub fn start() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(started_at: Instant) -> Self {
        Self {
            started_at,
            graphql: None,
        }
    }

    /// Wrap into the handle stored in request extensions.
    pub fn shared(self) -> SharedRequestMetrics {
        Rc::new(RefCell::new(self))
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64() * 1000.0
    }

    pub fn graphql(&self) -> Option<&GraphqlOperation> {
        self.graphql.as_ref()
    }

    /// First attachment wins; returns whether `op` was stored.
    pub fn attach(&mut self, op: GraphqlOperation) -> bool {
        if self.graphql.is_some() {
            return false;
        }
        self.graphql = Some(op);
        true
    }
}

/// Request context handle shared by the extensions and the middleware.
///
/// The middleware keeps its own clone so it never has to hold on to the
/// `HttpRequest` while the inner service runs.
pub type SharedRequestMetrics = Rc<RefCell<RequestMetrics>>;
