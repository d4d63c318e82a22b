//! promrelay - Prometheus metrics for actix-web hosts
//!
//! Collects HTTP, GraphQL and websocket metrics into an in-process registry
//! and publishes them through a scrape endpoint, a push gateway, or both.
//!
//! # Architecture
//! - `metrics`: instruments, registry, snapshots and the text encoder
//! - `metrics_core`: the `MetricsRecorder` seam adapters record through
//! - `push`: periodic delivery to a Prometheus push gateway
//! - `instrumentation`: GraphQL and websocket adapters
//! - `api`: HTTP middleware and the scrape endpoint
//! - `config`: configuration loading and validation
//! - `runtime`: plugin startup and shutdown
//! - `system`: logging and instance identity
//!
//! # Example
//! ```no_run
//! use actix_web::{App, HttpServer};
//! use promrelay::config::PluginConfig;
//! use promrelay::runtime::init_plugin;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = PluginConfig::load()?;
//! let plugin = std::sync::Arc::new(init_plugin(&config).await?);
//!
//! let app_plugin = plugin.clone();
//! HttpServer::new(move || {
//!     let plugin = app_plugin.clone();
//!     App::new()
//!         .wrap(plugin.middleware())
//!         .configure(move |cfg| {
//!             plugin.configure(cfg);
//!         })
//! })
//! .bind(("127.0.0.1", 8080))?
//! .run()
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod instrumentation;
pub mod metrics;
pub mod metrics_core;
pub mod push;
pub mod runtime;
pub mod system;
pub mod utils;

pub use errors::{MetricsError, Result};
pub use metrics::Registry;
pub use metrics_core::{MetricsRecorder, NoopMetrics};
