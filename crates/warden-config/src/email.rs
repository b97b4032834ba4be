use std::env;

use crate::env_or;

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    /// Base URL verification links point at, e.g. `https://app.example.com`.
    pub frontend_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@warden.local".to_string(),
            from_name: "Warden".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}

impl EmailConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env::var("SMTP_ENABLED")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.enabled),
            smtp_host: env::var("SMTP_HOST").unwrap_or(defaults.smtp_host),
            smtp_port: env_or("SMTP_PORT", defaults.smtp_port),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or(defaults.smtp_username),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or(defaults.smtp_password),
            from_email: env::var("FROM_EMAIL").unwrap_or(defaults.from_email),
            from_name: env::var("FROM_NAME").unwrap_or(defaults.from_name),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
        }
    }

    /// Builds a verification link for `path` carrying `token`.
    pub fn link(&self, path: &str, token: &str) -> String {
        format!(
            "{}/{}?token={}",
            self.frontend_url.trim_end_matches('/'),
            path.trim_start_matches('/'),
            token
        )
    }
}
