//! Gateway clients
//!
//! `GatewayClient` is the delivery seam; `HttpGateway` is the production
//! implementation. ureq is blocking, so requests run on the blocking pool.

use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;
use ureq::Agent;
use url::Url;

use super::job::{PUSH_CONTENT_TYPE, PUSH_TTL_SECONDS, PushJob};
use crate::errors::{MetricsError, Result};

#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Deliver one job. Any transport error or non-2xx answer is `Delivery`.
    async fn push(&self, job: &PushJob) -> Result<()>;
}

/// HTTP push gateway client
pub struct HttpGateway {
    base: Url,
    agent: Agent,
}

impl HttpGateway {
    pub fn new(base: Url, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { base, agent }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Blocking request, called inside `spawn_blocking`.
    fn push_sync(agent: &Agent, url: &str, payload: &[u8]) -> Result<()> {
        let resp = agent
            .post(url)
            .header("Content-Type", PUSH_CONTENT_TYPE)
            .header("TTL", PUSH_TTL_SECONDS.to_string())
            .send(payload)
            .map_err(|e| MetricsError::delivery(format!("push to \"{}\" failed: {}", url, e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MetricsError::delivery(format!(
                "gateway \"{}\" answered {}",
                url, status
            )));
        }
        trace!(url = %url, status = %status, "push accepted");
        Ok(())
    }
}

#[async_trait]
impl GatewayClient for HttpGateway {
    async fn push(&self, job: &PushJob) -> Result<()> {
        let url = job.url(&self.base);
        let agent = self.agent.clone();
        let payload = job.payload.clone();

        tokio::task::spawn_blocking(move || Self::push_sync(&agent, &url, &payload))
            .await
            .map_err(|e| MetricsError::delivery(format!("push task failed: {}", e)))?
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base", &self.base.as_str())
            .finish()
    }
}
