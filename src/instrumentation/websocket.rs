//! Websocket connection tracking
//!
//! Connect and disconnect events are deduplicated by connection identity so
//! `websocket_connections_active` never drifts on repeated events.
//! Entries are removed only on disconnect: a connection whose disconnect
//! event never arrives stays in the map for the process lifetime.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::Instant;
use tracing::trace;
use uuid::Uuid;

use crate::metrics_core::MetricsRecorder;

/// Identity of one websocket connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<Uuid> for ConnectionId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

pub struct WebsocketTracker {
    connections: DashMap<ConnectionId, Instant>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl WebsocketTracker {
    pub fn new(metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self {
            connections: DashMap::new(),
            metrics,
        }
    }

    /// Track a connection, assigning a fresh identity when none is given.
    ///
    /// The gauge only moves for identities not already tracked.
    pub fn connect(&self, id: Option<ConnectionId>) -> ConnectionId {
        let id = id.unwrap_or_else(ConnectionId::generate);
        match self.connections.entry(id.clone()) {
            Entry::Occupied(_) => {
                trace!(connection = %id, "connection already tracked");
            }
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                self.metrics.inc_websocket_connections();
            }
        }
        id
    }

    /// Forget a tracked connection. Unknown identities are a no-op.
    pub fn disconnect(&self, id: &ConnectionId) -> bool {
        if self.connections.remove(id).is_some() {
            self.metrics.dec_websocket_connections();
            true
        } else {
            trace!(connection = %id, "disconnect for untracked connection");
            false
        }
    }

    pub fn tracked(&self) -> usize {
        self.connections.len()
    }

    pub fn connected_since(&self, id: &ConnectionId) -> Option<Instant> {
        self.connections.get(id).map(|entry| *entry.value())
    }
}

impl std::fmt::Debug for WebsocketTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebsocketTracker")
            .field("tracked", &self.tracked())
            .finish()
    }
}
