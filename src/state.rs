use std::sync::Arc;

use tracing::warn;

use warden_auth::TokenCodec;
use warden_config::{
    EmailConfig, JwtConfig, PasswordConfig, VerificationConfig, WebhookConfig,
};
use warden_core::{AuthError, FieldRules, hash_password_with_cost};
use warden_db::{PgUserStore, UserStore, init_db_pool, run_migrations};
use warden_notify::{Dispatcher, Notifier, SmtpNotifier};

use crate::modules::oauth::avatar::{AvatarFetcher, HttpAvatarFetcher};

/// Everything the engine needs from the environment.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    pub webhook: WebhookConfig,
    pub verification: VerificationConfig,
    pub password: PasswordConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            email: EmailConfig::from_env(),
            webhook: WebhookConfig::from_env(),
            verification: VerificationConfig::from_env(),
            password: PasswordConfig::from_env(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub dispatcher: Dispatcher,
    pub codec: TokenCodec,
    pub rules: FieldRules,
    pub email_config: EmailConfig,
    pub verification_config: VerificationConfig,
    pub password_config: PasswordConfig,
    pub avatar_fetcher: Arc<dyn AvatarFetcher>,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, notifier: Arc<dyn Notifier>, config: AppConfig) -> Self {
        Self {
            store,
            dispatcher: Dispatcher::new(notifier, config.webhook.timeout),
            codec: TokenCodec::new(config.jwt),
            rules: FieldRules::new(),
            email_config: config.email,
            verification_config: config.verification,
            password_config: config.password,
            avatar_fetcher: Arc::new(HttpAvatarFetcher::default()),
        }
    }

    pub fn with_avatar_fetcher(mut self, fetcher: Arc<dyn AvatarFetcher>) -> Self {
        self.avatar_fetcher = fetcher;
        self
    }

    /// Hashes with the configured bcrypt cost.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        hash_password_with_cost(password, self.password_config.bcrypt_cost)
    }
}

/// Connects to Postgres, applies migrations and wires the SMTP notifier.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let pool = init_db_pool().await?;
    run_migrations(&pool).await?;

    let config = AppConfig::from_env();
    if config.jwt.uses_default_secret() {
        warn!("JWT_SECRET is not set; signing tokens with the built-in default secret");
    }
    let notifier = Arc::new(SmtpNotifier::new(
        config.email.clone(),
        config.webhook.clone(),
    ));

    Ok(AppState::new(
        Arc::new(PgUserStore::new(pool)),
        notifier,
        config,
    ))
}
