//! Email notification channel (SMTP with STARTTLS).

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use storekeep_notify::{Channel, ChannelError};

const DEFAULT_SUBJECT: &str = "Daily Store Report";

/// SMTP connection settings. The sender doubles as the default recipient.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub recipient: String,
}

impl SmtpConfig {
    /// Read `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`,
    /// optionally `REPORT_RECIPIENT` (defaults to the SMTP username). Any
    /// missing or unparsable variable means the channel is unconfigured.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;
        let port: u16 = std::env::var("SMTP_PORT").ok()?.parse().ok()?;
        let username = std::env::var("SMTP_USERNAME").ok()?;
        let password = std::env::var("SMTP_PASSWORD").ok()?;
        let recipient = std::env::var("REPORT_RECIPIENT").unwrap_or_else(|_| username.clone());
        Some(Self {
            host,
            port,
            username,
            password,
            recipient,
        })
    }
}

pub struct EmailChannel {
    config: Option<SmtpConfig>,
    subject: String,
}

impl EmailChannel {
    pub fn new(config: Option<SmtpConfig>) -> Self {
        Self {
            config,
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }
}

#[async_trait]
impl Channel for EmailChannel {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, text: &str) -> Result<(), ChannelError> {
        let cfg = self.config.as_ref().ok_or(ChannelError::Config)?;

        let from: Mailbox = cfg
            .username
            .parse()
            .map_err(|e| ChannelError::Transport(format!("sender address: {e}")))?;
        let to: Mailbox = cfg
            .recipient
            .parse()
            .map_err(|e| ChannelError::Transport(format!("recipient address: {e}")))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.clone())
            .body(text.to_string())
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
                .map_err(|e| ChannelError::Transport(e.to_string()))?
                .port(cfg.port)
                .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
                .build();

        mailer
            .send(message)
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;
        Ok(())
    }
}
