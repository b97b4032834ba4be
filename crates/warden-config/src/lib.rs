//! # Warden Config
//!
//! Configuration types for Warden, each loaded from environment variables with
//! development defaults:
//!
//! - [`jwt`]: signing secret, issuer and token lifetimes
//! - [`email`]: SMTP settings and the frontend URL used to build verification links
//! - [`webhook`]: optional security-event webhook endpoint
//! - [`verification`]: lifetimes of verification tokens per flow
//! - [`server`]: HTTP listener address and bcrypt cost
//!
//! # Example
//!
//! ```ignore
//! use warden_config::{EmailConfig, JwtConfig, VerificationConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let email_config = EmailConfig::from_env();
//! let verification_config = VerificationConfig::from_env();
//! ```

pub mod email;
pub mod jwt;
pub mod server;
pub mod verification;
pub mod webhook;

pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use server::{PasswordConfig, ServerConfig};
pub use verification::VerificationConfig;
pub use webhook::WebhookConfig;

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
