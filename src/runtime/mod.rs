//! Plugin lifecycle
//!
//! `lifetime::startup::init_plugin` wires registry, standard metrics,
//! adapters and the push dispatcher from a `PluginConfig`;
//! `PluginHandle::shutdown` stops the push loop.

pub mod lifetime;

pub use lifetime::startup::{PluginHandle, init_plugin, init_plugin_with_gateway};
