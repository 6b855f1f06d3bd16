use async_trait::async_trait;

use crate::{config::Config, utils::email::send_email};

/// Rendered message content, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// `Ok` means the transport accepted the message. No retries here.
    async fn send(&self, to: &str, notification: &Notification) -> anyhow::Result<()>;
}

/// Sends notifications over the configured SMTP relay.
#[derive(Clone)]
pub struct EmailNotifier {
    config: Config,
}

impl EmailNotifier {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, to: &str, notification: &Notification) -> anyhow::Result<()> {
        send_email(
            &self.config,
            to,
            &notification.subject,
            &notification.html_body,
            &notification.text_body,
        )
        .await
    }
}
