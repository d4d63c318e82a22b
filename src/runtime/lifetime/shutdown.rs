use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

use super::startup::PluginHandle;

/// Seconds to wait for the push loop to exit
const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

impl PluginHandle {
    /// Cancel the push loop and wait for it to exit.
    ///
    /// An attempt already in flight is not joined; it ends on its own
    /// timeout.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();

        let Some(task) = self.push_task.take() else {
            info!("Metrics plugin stopped");
            return;
        };

        match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), task).await {
            Ok(Ok(())) => {
                info!("Push dispatcher stopped, metrics plugin shut down");
            }
            Ok(Err(e)) => {
                warn!("Push dispatcher task ended abnormally: {}", e);
            }
            Err(_) => {
                error!(
                    "Push dispatcher did not stop within {} seconds",
                    SHUTDOWN_TIMEOUT_SECS
                );
            }
        }
    }
}
