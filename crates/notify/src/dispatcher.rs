use std::sync::Arc;
use std::time::Duration;

use crate::{Channel, ChannelOutcome, Delivery, DispatchOutcome};

const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fans a report out to every configured channel.
///
/// Attempts run as independent tasks: a slow, failing, or panicking channel
/// cannot delay, block, or roll back any other. Each channel is attempted
/// exactly once per call; retry policy belongs to the operator, not here.
#[derive(Clone)]
pub struct NotificationDispatcher {
    channels: Vec<Arc<dyn Channel>>,
    attempt_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(channels: Vec<Arc<dyn Channel>>) -> Self {
        Self {
            channels,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Deliver `text` through all channels concurrently.
    ///
    /// Never fails as a whole: every per-channel error, timeout, or panic is
    /// captured in the outcome.
    pub async fn dispatch(&self, text: &str) -> DispatchOutcome {
        let attempts: Vec<(String, tokio::task::JoinHandle<Delivery>)> = self
            .channels
            .iter()
            .map(|channel| {
                let channel = channel.clone();
                let text = text.to_string();
                let timeout = self.attempt_timeout;
                let name = channel.name().to_string();
                let handle = tokio::spawn(async move {
                    match tokio::time::timeout(timeout, channel.send(&text)).await {
                        Ok(Ok(())) => Delivery::Success,
                        Ok(Err(e)) => Delivery::Failure { reason: e.reason() },
                        Err(_) => Delivery::Failure {
                            reason: "timeout".to_string(),
                        },
                    }
                });
                (name, handle)
            })
            .collect();

        let mut outcome = DispatchOutcome::default();
        for (channel, handle) in attempts {
            let delivery = match handle.await {
                Ok(delivery) => delivery,
                // A panicking channel is still just that channel's failure.
                Err(e) => Delivery::Failure {
                    reason: format!("task failed: {e}"),
                },
            };
            match &delivery {
                Delivery::Success => {
                    tracing::info!(channel = %channel, "notification delivered");
                }
                Delivery::Failure { reason } => {
                    tracing::warn!(channel = %channel, reason = %reason, "notification failed");
                }
            }
            outcome.channels.push(ChannelOutcome { channel, delivery });
        }

        outcome
    }
}
