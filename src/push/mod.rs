//! Push gateway delivery
//!
//! A `PushDispatcher` snapshots the registry on a fixed interval, wraps
//! the encoded payload in a `PushJob` and hands it to a `GatewayClient`.
//! Failed deliveries are logged and counted; the ticker keeps running.

pub mod dispatcher;
pub mod gateway;
pub mod job;

pub use crate::config::PushSettings;
pub use dispatcher::{DispatcherState, PushDispatcher, TickOutcome};
pub use gateway::{GatewayClient, HttpGateway};
pub use job::{PUSH_CONTENT_TYPE, PUSH_TTL_SECONDS, PushJob};
