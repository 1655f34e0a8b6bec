//! Best-effort notification fan-out.
//!
//! Channels are independent transports; the dispatcher attempts each exactly
//! once per call and folds every failure into a structured outcome instead of
//! propagating it. The dispatch call itself cannot fail.

pub mod dispatcher;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use dispatcher::NotificationDispatcher;

/// Failure of a single channel attempt.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Channel-specific configuration is missing or unusable.
    #[error("config")]
    Config,

    /// The transport rejected or dropped the delivery.
    #[error("transport: {0}")]
    Transport(String),
}

impl ChannelError {
    /// Short reason recorded in the dispatch outcome.
    pub fn reason(&self) -> String {
        match self {
            ChannelError::Config => "config".to_string(),
            ChannelError::Transport(msg) => msg.clone(),
        }
    }
}

/// An independent notification transport.
#[async_trait]
pub trait Channel: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Attempt delivery once. No retries here; at-most-once per dispatch.
    async fn send(&self, text: &str) -> Result<(), ChannelError>;
}

/// What happened to one channel attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Delivery {
    Success,
    Failure { reason: String },
}

/// Per-channel result of one dispatch call, in configured channel order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchOutcome {
    pub channels: Vec<ChannelOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelOutcome {
    pub channel: String,
    #[serde(flatten)]
    pub delivery: Delivery,
}

impl DispatchOutcome {
    pub fn delivery_for(&self, channel: &str) -> Option<&Delivery> {
        self.channels
            .iter()
            .find(|o| o.channel == channel)
            .map(|o| &o.delivery)
    }

    pub fn all_delivered(&self) -> bool {
        self.channels
            .iter()
            .all(|o| o.delivery == Delivery::Success)
    }
}
