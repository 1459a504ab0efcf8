//! Staff notifications.
//!
//! Every administrative action announces itself in the operations group
//! chat. Delivery is best effort: services hand the text to a
//! [`NotificationDispatcher`] and move on; the worker task owns the actual
//! [`Notifier`] call and only logs and counts what goes wrong.

use async_trait::async_trait;
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::AppConfig;

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Channel rejected message: {0}")]
    Rejected(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// A channel that can deliver one text message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotificationError>;
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        info!(target: "itsfood_admin::notifications", %message, "notification");
        Ok(())
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Posts messages to a Telegram group through the bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        api_base: &str,
        bot_token: &str,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                api_base.trim_end_matches('/'),
                bot_token
            ),
            chat_id: chat_id.into(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip(self, message))]
    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text: message,
            })
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotificationError::Rejected(format!(
                "telegram answered {}",
                response.status()
            )))
        }
    }
}

/// Builds the notifier selected by `notification_channel`.
pub fn notifier_from_config(config: &AppConfig) -> Result<Arc<dyn Notifier>, NotificationError> {
    match config.notification_channel.to_ascii_lowercase().as_str() {
        "telegram" => {
            let token = config.telegram_bot_token.as_deref().ok_or_else(|| {
                NotificationError::Configuration("telegram_bot_token is not set".into())
            })?;
            let chat_id = config.telegram_chat_id.clone().ok_or_else(|| {
                NotificationError::Configuration("telegram_chat_id is not set".into())
            })?;
            Ok(Arc::new(TelegramNotifier::new(
                &config.telegram_api_base,
                token,
                chat_id,
                config.notification_timeout(),
            )?))
        }
        "log" => Ok(Arc::new(LogNotifier)),
        other => Err(NotificationError::Configuration(format!(
            "unknown notification channel '{}'",
            other
        ))),
    }
}

/// Fire-and-forget front of the notification channel.
///
/// `dispatch` never blocks and never reports the outcome. Messages are
/// delivered in submission order by a single worker.
#[derive(Clone, Debug)]
pub struct NotificationDispatcher {
    sender: mpsc::UnboundedSender<String>,
}

impl NotificationDispatcher {
    /// Starts the worker on the current runtime.
    pub fn spawn(notifier: Arc<dyn Notifier>) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(notifier, receiver));
        (Self { sender }, handle)
    }

    pub fn dispatch(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(len = message.len(), "queueing notification");
        if self.sender.send(message).is_err() {
            warn!("notification worker is gone, message dropped");
            counter!("itsfood_notifications.dropped", 1);
        }
    }
}

async fn run_worker(notifier: Arc<dyn Notifier>, mut receiver: mpsc::UnboundedReceiver<String>) {
    while let Some(message) = receiver.recv().await {
        match notifier.send(&message).await {
            Ok(()) => counter!("itsfood_notifications.sent", 1),
            Err(e) => {
                warn!(error = %e, "notification delivery failed");
                counter!("itsfood_notifications.failed", 1);
            }
        }
    }
    debug!("notification worker stopped");
}
