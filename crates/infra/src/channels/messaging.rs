//! Messaging notification channel (Twilio-style REST API).

use async_trait::async_trait;

use storekeep_notify::{Channel, ChannelError};

const DEFAULT_API_BASE: &str = "https://api.twilio.com";
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

/// Credentials and addressing for the messaging provider.
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub to_number: String,
}

impl MessagingConfig {
    /// Read `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `TWILIO_PHONE_NUMBER`,
    /// `ADMIN_PHONE_NUMBER`. Any missing variable means the channel is
    /// unconfigured: a per-dispatch `Failure("config")`, not a startup error.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            account_sid: std::env::var("TWILIO_ACCOUNT_SID").ok()?,
            auth_token: std::env::var("TWILIO_AUTH_TOKEN").ok()?,
            from_number: std::env::var("TWILIO_PHONE_NUMBER").ok()?,
            to_number: std::env::var("ADMIN_PHONE_NUMBER").ok()?,
        })
    }
}

pub struct MessagingChannel {
    config: Option<MessagingConfig>,
    http: reqwest::Client,
    api_base: String,
}

impl MessagingChannel {
    pub fn new(config: Option<MessagingConfig>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            config,
            http,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl Channel for MessagingChannel {
    fn name(&self) -> &str {
        "messaging"
    }

    async fn send(&self, text: &str) -> Result<(), ChannelError> {
        let cfg = self.config.as_ref().ok_or(ChannelError::Config)?;

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, cfg.account_sid
        );
        let params = [
            ("To", cfg.to_number.as_str()),
            ("From", cfg.from_number.as_str()),
            ("Body", text),
        ];

        let response = self
            .http
            .post(&url)
            .basic_auth(&cfg.account_sid, Some(&cfg.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Transport(format!(
                "provider returned {status}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_channel_fails_with_config_reason() {
        let channel = MessagingChannel::new(None);
        let err = channel.send("report").await.unwrap_err();
        assert_eq!(err.reason(), "config");
    }
}
