#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use uuid::Uuid;

use warden::modules::auth::SessionService;
use warden::modules::oauth::AvatarFetcher;
use warden::state::{AppConfig, AppState};
use warden::warden_config::{JwtConfig, PasswordConfig};
use warden::warden_db::MemoryUserStore;
use warden::warden_models::Role;
use warden::warden_notify::{
    EmailMessage, EmailTemplate, Notifier, NotifyError, WebhookNotification,
};

pub const PASSWORD: &str = "correct horse battery staple";

/// Forwards every notification to the test through a channel.
pub struct RecordingNotifier {
    emails: UnboundedSender<EmailMessage>,
    webhooks: UnboundedSender<WebhookNotification>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let _ = self.emails.send(message.clone());
        Ok(())
    }

    async fn invoke_webhook(&self, notification: &WebhookNotification) -> Result<(), NotifyError> {
        let _ = self.webhooks.send(notification.clone());
        Ok(())
    }
}

/// Receiving side of a [`RecordingNotifier`].
pub struct Outbox {
    emails: UnboundedReceiver<EmailMessage>,
    webhooks: UnboundedReceiver<WebhookNotification>,
    held: Vec<EmailMessage>,
}

impl Outbox {
    /// Waits for the next email rendered from `template`. Emails of other
    /// templates received meanwhile are kept for later calls.
    pub async fn email(&mut self, template: EmailTemplate) -> EmailMessage {
        if let Some(pos) = self.held.iter().position(|m| m.template == template) {
            return self.held.remove(pos);
        }
        loop {
            let message = tokio::time::timeout(Duration::from_secs(2), self.emails.recv())
                .await
                .unwrap_or_else(|_| panic!("no {:?} email was sent", template))
                .expect("notifier dropped");
            if message.template == template {
                return message;
            }
            self.held.push(message);
        }
    }

    /// Token carried by the next email of `template`.
    pub async fn token(&mut self, template: EmailTemplate) -> String {
        self.email(template)
            .await
            .token
            .expect("verification email without a token")
    }

    pub async fn webhook(&mut self) -> WebhookNotification {
        tokio::time::timeout(Duration::from_secs(2), self.webhooks.recv())
            .await
            .expect("no webhook was sent")
            .expect("notifier dropped")
    }

    /// Waits for a webhook whose message is `message`, skipping others.
    pub async fn webhook_with(&mut self, message: &str) -> WebhookNotification {
        loop {
            let hook = self.webhook().await;
            if hook.message == message {
                return hook;
            }
        }
    }

    /// Lets spawned deliveries run, then reports whether any `template` email
    /// is pending.
    pub async fn saw(&mut self, template: EmailTemplate) -> bool {
        tokio::time::sleep(Duration::from_millis(50)).await;
        while let Ok(message) = self.emails.try_recv() {
            self.held.push(message);
        }
        self.held.iter().any(|m| m.template == template)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt: JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "warden-test".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
        },
        password: PasswordConfig { bcrypt_cost: 4 },
        ..AppConfig::default()
    }
}

pub fn test_state_with(config: AppConfig) -> (AppState, Outbox) {
    let (email_tx, email_rx) = unbounded_channel();
    let (hook_tx, hook_rx) = unbounded_channel();
    let notifier = Arc::new(RecordingNotifier {
        emails: email_tx,
        webhooks: hook_tx,
    });

    let state = AppState::new(Arc::new(MemoryUserStore::new()), notifier, config)
        .with_avatar_fetcher(Arc::new(StaticAvatar(Some(PNG_HEADER.to_vec()))));

    (
        state,
        Outbox {
            emails: email_rx,
            webhooks: hook_rx,
            held: Vec::new(),
        },
    )
}

pub fn test_state() -> (AppState, Outbox) {
    test_state_with(test_config())
}

/// Creates a verified password account.
pub async fn create_user(state: &AppState, username: &str) -> Uuid {
    SessionService::signup(
        state,
        username,
        &format!("{}@example.com", username),
        PASSWORD,
        Role::User,
    )
    .await
    .unwrap()
}

pub const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Returns the same bytes for every URL, or fails when built with `None`.
pub struct StaticAvatar(pub Option<Vec<u8>>);

#[async_trait]
impl AvatarFetcher for StaticAvatar {
    async fn fetch(&self, _url: &str) -> anyhow::Result<Vec<u8>> {
        self.0
            .clone()
            .ok_or_else(|| anyhow::anyhow!("avatar host unreachable"))
    }
}
