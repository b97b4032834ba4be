use async_trait::async_trait;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::instrument;
use warden_config::{EmailConfig, WebhookConfig};

use crate::message::{EmailMessage, WebhookNotification};
use crate::templates::{render_html, render_text};
use crate::{Notifier, NotifyError};

/// Delivers email over SMTP and webhooks over HTTP.
///
/// With `SMTP_ENABLED` off, emails are logged instead of sent; with no
/// `WEBHOOK_URL`, webhook calls are no-ops.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    email: EmailConfig,
    webhook: WebhookConfig,
    http: reqwest::Client,
}

impl SmtpNotifier {
    pub fn new(email: EmailConfig, webhook: WebhookConfig) -> Self {
        Self {
            email,
            webhook,
            http: reqwest::Client::new(),
        }
    }

    fn build_message(&self, message: &EmailMessage) -> Result<Message, NotifyError> {
        let from = format!("{} <{}>", self.email.from_name, self.email.from_email);
        let text_body = render_text(message, &self.email.from_name);
        let html_body = render_html(message, &self.email.from_name);

        Message::builder()
            .from(
                from.parse()
                    .map_err(|e| NotifyError::InvalidAddress(format!("{}: {}", from, e)))?,
            )
            .to(message
                .to_address
                .parse()
                .map_err(|e| NotifyError::InvalidAddress(format!("{}: {}", message.to_address, e)))?)
            .subject(message.template.subject())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| NotifyError::Build(e.to_string()))
    }

    fn transport(&self) -> Result<SmtpTransport, NotifyError> {
        if self.email.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&self.email.smtp_host)
                .port(self.email.smtp_port)
                .build());
        }

        let creds = Credentials::new(
            self.email.smtp_username.clone(),
            self.email.smtp_password.clone(),
        );

        Ok(SmtpTransport::relay(&self.email.smtp_host)
            .map_err(|e| NotifyError::Transport(format!("Failed to create SMTP relay: {}", e)))?
            .port(self.email.smtp_port)
            .credentials(creds)
            .build())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    #[instrument(skip(self, message), fields(to = %message.to_address, template = ?message.template))]
    async fn send_email(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        if !self.email.enabled {
            tracing::info!(
                link = message.link.as_deref().unwrap_or(""),
                "SMTP disabled, email not sent"
            );
            return Ok(());
        }

        let email = self.build_message(message)?;
        let mailer = self.transport()?;

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| NotifyError::Transport(format!("Task join error: {}", e)))?
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self, notification), fields(identifier = %notification.identifier))]
    async fn invoke_webhook(
        &self,
        notification: &WebhookNotification,
    ) -> Result<(), NotifyError> {
        let Some(url) = self.webhook.url.as_deref() else {
            return Ok(());
        };

        let response = self
            .http
            .post(url)
            .timeout(self.webhook.timeout)
            .json(notification)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Timeout
                } else {
                    NotifyError::Webhook(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(NotifyError::Webhook(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::EmailTemplate;

    #[tokio::test]
    async fn test_disabled_smtp_is_a_no_op() {
        let notifier = SmtpNotifier::new(EmailConfig::default(), WebhookConfig::default());
        let msg = EmailMessage::new("alice@x.com", "alice", EmailTemplate::NewLogin);
        assert!(notifier.send_email(&msg).await.is_ok());
    }

    #[tokio::test]
    async fn test_webhook_without_url_is_a_no_op() {
        let notifier = SmtpNotifier::new(EmailConfig::default(), WebhookConfig::default());
        let hook = WebhookNotification::new("alice", "Login successful");
        assert!(notifier.invoke_webhook(&hook).await.is_ok());
    }

    #[test]
    fn test_invalid_recipient_is_rejected() {
        let notifier = SmtpNotifier::new(EmailConfig::default(), WebhookConfig::default());
        let msg = EmailMessage::new("not an address", "alice", EmailTemplate::NewLogin);
        assert!(matches!(
            notifier.build_message(&msg),
            Err(NotifyError::InvalidAddress(_))
        ));
    }
}
