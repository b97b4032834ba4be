use std::env;
use std::time::Duration;

use crate::env_or;

/// Security-event webhook. Disabled when `url` is `None`.
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub url: Option<String>,
    /// Hard upper bound on a single webhook call.
    pub timeout: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_millis(1000),
        }
    }
}

impl WebhookConfig {
    pub fn from_env() -> Self {
        Self {
            url: env::var("WEBHOOK_URL").ok().filter(|u| !u.is_empty()),
            timeout: Duration::from_millis(env_or("WEBHOOK_TIMEOUT_MS", 1000)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }
}
