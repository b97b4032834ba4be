//! Fire-and-forget delivery.
//!
//! Each notification runs on its own spawned task. The caller never waits for
//! delivery and never sees a delivery error.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::Notifier;
use crate::message::{EmailMessage, WebhookNotification};

#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    webhook_timeout: Duration,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("webhook_timeout", &self.webhook_timeout)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, webhook_timeout: Duration) -> Self {
        Self {
            notifier,
            webhook_timeout,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn email(&self, message: EmailMessage) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.send_email(&message).await {
                warn!(
                    to = %message.to_address,
                    template = ?message.template,
                    error = %e,
                    "Failed to send email"
                );
            }
        });
    }

    /// Posts `{identifier, message}` to the webhook, giving up after the
    /// configured timeout.
    pub fn webhook(&self, identifier: impl Into<String>, message: impl Into<String>) {
        let notifier = Arc::clone(&self.notifier);
        let timeout = self.webhook_timeout;
        let notification = WebhookNotification::new(identifier, message);
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, notifier.invoke_webhook(&notification)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(
                    identifier = %notification.identifier,
                    error = %e,
                    "Webhook call failed"
                ),
                Err(_) => warn!(
                    identifier = %notification.identifier,
                    timeout_ms = timeout.as_millis() as u64,
                    "Webhook call timed out"
                ),
            }
        });
    }
}
