use actix_web::web;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::middleware::PrometheusMiddleware;
use crate::api::services::configure_metrics_route;
use crate::config::PluginConfig;
use crate::instrumentation::WebsocketTracker;
use crate::metrics::{PluginMetrics, Registry};
use crate::metrics_core::MetricsRecorder;
use crate::push::{GatewayClient, HttpGateway, PushDispatcher};

/// Everything the host needs after startup.
///
/// Dropping the handle cancels the push loop; call
/// [`shutdown`](PluginHandle::shutdown) to also wait for it to stop.
pub struct PluginHandle {
    pub registry: Arc<Registry>,
    pub metrics: Arc<PluginMetrics>,
    pub websockets: Arc<WebsocketTracker>,
    pub dispatcher: Option<Arc<PushDispatcher>>,
    pub(crate) mount_path: Option<String>,
    pub(crate) cancel: CancellationToken,
    pub(crate) push_task: Option<JoinHandle<()>>,
}

impl PluginHandle {
    pub fn recorder(&self) -> Arc<dyn MetricsRecorder> {
        self.metrics.clone()
    }

    /// HTTP middleware recording into this plugin's metrics.
    pub fn middleware(&self) -> PrometheusMiddleware {
        PrometheusMiddleware::new(self.recorder())
    }

    /// Mount the scrape endpoint if a mount path is configured.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) -> bool {
        configure_metrics_route(cfg, self.mount_path.as_deref(), self.registry.clone())
    }

    pub fn mount_path(&self) -> Option<&str> {
        self.mount_path.as_deref()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for PluginHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Initialize the plugin, delivering pushes over HTTP.
///
/// Must run inside a tokio runtime when a push gateway is configured.
pub async fn init_plugin(config: &PluginConfig) -> Result<PluginHandle> {
    let gateway = match config
        .push_settings()
        .context("Invalid push gateway configuration")?
    {
        Some(settings) => Some(Arc::new(HttpGateway::new(
            settings.gateway_url.clone(),
            settings.timeout,
        )) as Arc<dyn GatewayClient>),
        None => None,
    };
    init_plugin_with_gateway(config, gateway).await
}

/// Initialize the plugin with a caller-supplied gateway client.
///
/// `gateway` is only used when the config enables pushing.
pub async fn init_plugin_with_gateway(
    config: &PluginConfig,
    gateway: Option<Arc<dyn GatewayClient>>,
) -> Result<PluginHandle> {
    let start_time = std::time::Instant::now();
    debug!("Starting metrics plugin initialization...");

    config
        .validate()
        .context("Invalid plugin configuration")?;

    let registry = Registry::arc();
    let metrics =
        PluginMetrics::register(&registry).context("Failed to register standard metrics")?;
    let recorder: Arc<dyn MetricsRecorder> = metrics.clone();
    let websockets = Arc::new(WebsocketTracker::new(recorder));

    let cancel = CancellationToken::new();
    let (dispatcher, push_task) = match (config.push_settings()?, gateway) {
        (Some(settings), Some(gateway)) => {
            let dispatcher = Arc::new(PushDispatcher::new(registry.clone(), gateway, settings));
            let task = dispatcher.clone().start(cancel.clone());
            (Some(dispatcher), Some(task))
        }
        (Some(_), None) => {
            anyhow::bail!("Push gateway configured but no gateway client supplied");
        }
        (None, _) => {
            info!("Push gateway not configured, push dispatcher disabled");
            (None, None)
        }
    };

    let mount_path = config.mount_path().map(str::to_string);
    match &mount_path {
        Some(path) => info!("Metrics endpoint available at: {}", path),
        None => info!("Metrics endpoint disabled (METRICS_MOUNT_PATH not set)"),
    }

    debug!(
        "Metrics plugin initialized in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(PluginHandle {
        registry,
        metrics,
        websockets,
        dispatcher,
        mount_path,
        cancel,
        push_task,
    })
}
