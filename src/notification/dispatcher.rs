//! Runs a blocking alert plugin from async code.

use crate::core::{AlertInfo, AlertPlugin, ChannelError, DispatchOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task;
use tracing::{error, info, instrument};

/// Sends alerts to a notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A unique, descriptive name for the channel (e.g., "curl").
    /// Used for logging.
    fn name(&self) -> &str;

    /// Sends an alert and reports the outcome.
    async fn notify(&self, info: AlertInfo) -> DispatchOutcome;
}

/// Adapts a blocking `AlertPlugin` to the async `Notifier` contract.
///
/// Each call runs on tokio's blocking pool, so a slow delivery command
/// never stalls the runtime's worker threads.
pub struct ChannelDispatcher<P: AlertPlugin + 'static> {
    plugin: Arc<P>,
}

impl<P: AlertPlugin + 'static> ChannelDispatcher<P> {
    /// Creates a new `ChannelDispatcher`.
    pub fn new(plugin: Arc<P>) -> Self {
        Self { plugin }
    }

    /// The wrapped plugin.
    pub fn plugin(&self) -> &P {
        &self.plugin
    }
}

#[async_trait]
impl<P: AlertPlugin + 'static> Notifier for ChannelDispatcher<P> {
    fn name(&self) -> &str {
        self.plugin.id()
    }

    #[instrument(skip_all)]
    async fn notify(&self, info: AlertInfo) -> DispatchOutcome {
        let plugin = Arc::clone(&self.plugin);
        let result = task::spawn_blocking(move || plugin.process(&info)).await;

        match result {
            Ok(outcome) => {
                info!(channel = self.plugin.id(), status = ?outcome.status(), "Dispatch finished");
                outcome
            }
            Err(e) => {
                let e = ChannelError::Join(e.to_string());
                error!(channel = self.plugin.id(), error = %e, "Dispatch task failed");
                DispatchOutcome::indeterminate(e.to_string())
            }
        }
    }
}
