//! # Warden Notify
//!
//! Outbound notifications for account security events.
//!
//! - [`Notifier`]: the capability: send an email, invoke the webhook
//! - [`SmtpNotifier`]: lettre SMTP plus a reqwest webhook client
//! - [`LogNotifier`]: writes every notification to the log, for development
//! - [`Dispatcher`]: fire-and-forget wrapper used by the engine
//!
//! Notification failures never propagate to the operation that triggered
//! them; the dispatcher logs and drops them.

pub mod dispatch;
pub mod error;
pub mod message;
pub mod smtp;
mod templates;

use async_trait::async_trait;

pub use dispatch::Dispatcher;
pub use error::NotifyError;
pub use message::{EmailMessage, EmailTemplate, WebhookNotification};
pub use smtp::SmtpNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), NotifyError>;

    async fn invoke_webhook(&self, notification: &WebhookNotification)
    -> Result<(), NotifyError>;
}

/// Logs notifications instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        tracing::info!(
            to = %message.to_address,
            template = ?message.template,
            link = message.link.as_deref().unwrap_or(""),
            "Email (not sent)"
        );
        Ok(())
    }

    async fn invoke_webhook(
        &self,
        notification: &WebhookNotification,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            identifier = %notification.identifier,
            message = %notification.message,
            "Webhook (not sent)"
        );
        Ok(())
    }
}
