//! Periodic push loop
//!
//! State machine:
//!
//! ```text
//! Idle ──start()──▶ Scheduled ──tick──▶ Pushing ──done──▶ Scheduled
//!   ▲                   │
//!   └────cancelled──────┘
//! ```
//!
//! Every attempt runs as its own task so a slow gateway never delays the
//! ticker. A tick that finds the previous attempt still in flight is
//! skipped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::gateway::GatewayClient;
use super::job::PushJob;
use crate::config::PushSettings;
use crate::errors::{MetricsError, Result};
use crate::metrics::Registry;
use crate::utils::TimeParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Scheduled,
    Pushing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Dispatched,
    /// The previous attempt had not finished yet.
    Skipped,
}

pub struct PushDispatcher {
    registry: Arc<Registry>,
    gateway: Arc<dyn GatewayClient>,
    settings: PushSettings,
    armed: AtomicBool,
    in_flight: AtomicBool,
    pushes: AtomicU64,
    failures: AtomicU64,
}

/// Releases the in-flight flag when the attempt ends, however it ends.
struct InFlightGuard(Arc<PushDispatcher>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}

impl PushDispatcher {
    pub fn new(
        registry: Arc<Registry>,
        gateway: Arc<dyn GatewayClient>,
        settings: PushSettings,
    ) -> Self {
        Self {
            registry,
            gateway,
            settings,
            armed: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            pushes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &PushSettings {
        &self.settings
    }

    pub fn state(&self) -> DispatcherState {
        if self.in_flight.load(Ordering::Acquire) {
            DispatcherState::Pushing
        } else if self.armed.load(Ordering::Acquire) {
            DispatcherState::Scheduled
        } else {
            DispatcherState::Idle
        }
    }

    /// Successful deliveries so far.
    pub fn pushes(&self) -> u64 {
        self.pushes.load(Ordering::Relaxed)
    }

    /// Failed deliveries so far.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Snapshot the registry into a job with the configured grouping labels.
    pub fn build_job(&self) -> PushJob {
        PushJob::new(
            self.settings.job_name.clone(),
            vec![
                ("instance".to_string(), self.settings.instance.clone()),
                (
                    "installation_domain".to_string(),
                    self.settings.installation_domain.clone(),
                ),
            ],
            self.registry.encode(),
        )
    }

    /// Build and deliver one job, bounded by the push timeout.
    pub async fn push_once(&self) -> Result<()> {
        let job = self.build_job();
        match timeout(self.settings.timeout, self.gateway.push(&job)).await {
            Ok(result) => result,
            Err(_) => Err(MetricsError::delivery(format!(
                "push timed out after {}",
                TimeParser::format_duration(self.settings.timeout)
            ))),
        }
    }

    /// Dispatch one attempt unless the previous one is still running.
    pub fn tick(self: &Arc<Self>) -> TickOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(job = %self.settings.job_name, "previous push still in flight, skipping tick");
            return TickOutcome::Skipped;
        }

        let guard = InFlightGuard(Arc::clone(self));
        tokio::spawn(async move {
            guard.0.attempt().await;
            drop(guard);
        });
        TickOutcome::Dispatched
    }

    async fn attempt(&self) {
        match self.push_once().await {
            Ok(()) => {
                self.pushes.fetch_add(1, Ordering::Relaxed);
                debug!(
                    job = %self.settings.job_name,
                    instance = %self.settings.instance,
                    "pushed metrics to gateway"
                );
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    job = %self.settings.job_name,
                    gateway = %self.settings.gateway_url,
                    error = %e,
                    "failed to push metrics"
                );
            }
        }
    }

    /// Arm the ticker. The first push happens one interval after start;
    /// missed ticks are skipped. Cancelling `token` stops the loop without
    /// waiting for an in-flight attempt.
    pub fn start(self: Arc<Self>, token: CancellationToken) -> JoinHandle<()> {
        self.armed.store(true, Ordering::Release);
        let period = self.settings.interval;

        info!(
            gateway = %self.settings.gateway_url,
            job = %self.settings.job_name,
            interval = %TimeParser::format_duration(period),
            "push dispatcher started"
        );

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        self.tick();
                    }
                }
            }

            self.armed.store(false, Ordering::Release);
            info!(job = %self.settings.job_name, "push dispatcher stopped");
        })
    }
}

impl std::fmt::Debug for PushDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushDispatcher")
            .field("job", &self.settings.job_name)
            .field("state", &self.state())
            .field("pushes", &self.pushes())
            .field("failures", &self.failures())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;
    use url::Url;

    struct BlockingGateway {
        release: Notify,
    }

    #[async_trait]
    impl GatewayClient for BlockingGateway {
        async fn push(&self, _job: &PushJob) -> Result<()> {
            self.release.notified().await;
            Ok(())
        }
    }

    fn settings() -> PushSettings {
        PushSettings {
            gateway_url: Url::parse("http://gateway:9091").unwrap(),
            job_name: "api".into(),
            interval: Duration::from_secs(60),
            timeout: Duration::from_secs(5),
            instance: "web-1".into(),
            installation_domain: "app.example.com".into(),
        }
    }

    #[tokio::test]
    async fn tick_skips_while_pushing() {
        let gateway = Arc::new(BlockingGateway {
            release: Notify::new(),
        });
        let dispatcher = Arc::new(PushDispatcher::new(
            Registry::arc(),
            gateway.clone(),
            settings(),
        ));

        assert_eq!(dispatcher.tick(), TickOutcome::Dispatched);
        assert_eq!(dispatcher.state(), DispatcherState::Pushing);
        assert_eq!(dispatcher.tick(), TickOutcome::Skipped);

        gateway.release.notify_one();
        for _ in 0..100 {
            if dispatcher.state() != DispatcherState::Pushing {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(dispatcher.state(), DispatcherState::Idle);
        assert_eq!(dispatcher.pushes(), 1);
        assert_eq!(dispatcher.tick(), TickOutcome::Dispatched);
    }

    #[tokio::test]
    async fn build_job_carries_grouping_labels() {
        let registry = Registry::arc();
        registry.register_counter("hits", "Hits", &[]).unwrap();
        let dispatcher = PushDispatcher::new(
            registry,
            Arc::new(BlockingGateway {
                release: Notify::new(),
            }),
            settings(),
        );

        let job = dispatcher.build_job();
        assert_eq!(job.job, "api");
        assert_eq!(
            job.path(),
            "/metrics/job/api/instance/web-1/installation_domain/app.example.com"
        );
        assert!(String::from_utf8(job.payload).unwrap().contains("# TYPE hits counter"));
    }

    #[tokio::test]
    async fn push_once_times_out() {
        let mut settings = settings();
        settings.timeout = Duration::from_millis(20);
        let dispatcher = PushDispatcher::new(
            Registry::arc(),
            Arc::new(BlockingGateway {
                release: Notify::new(),
            }),
            settings,
        );

        let err = dispatcher.push_once().await.unwrap_err();
        assert!(matches!(err, MetricsError::Delivery(_)));
    }
}
