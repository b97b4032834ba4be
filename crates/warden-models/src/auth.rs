//! JSON request and response bodies for the HTTP binding.
//!
//! The engine applies its own field rules; the `validator` attributes here only
//! reject structurally empty requests before they reach it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub use warden_auth::TokenPair;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    /// When true the account stays unverified until the emailed link is confirmed.
    #[serde(default)]
    pub require_verification: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub user_id: Uuid,
    pub verification_required: bool,
}

/// Login with either a username or an email address.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub identifier: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Body of every confirm and cancel endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerificationTokenRequest {
    #[validate(length(min = 1))]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateEmailRequest {
    #[validate(length(min = 1))]
    pub new_email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUsernameRequest {
    #[validate(length(min = 1))]
    pub new_username: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 1))]
    pub new_password: String,
}

/// Identity assertion forwarded by the OAuth callback after the provider's code
/// exchange.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OAuthLoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub display_name: String,
    #[validate(url)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_defaults() {
        let json = r#"{"username":"alice","email":"alice@x.com","password":"pw123"}"#;
        let req: SignupRequest = serde_json::from_str(json).unwrap();
        assert!(!req.require_verification);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_login_request_rejects_empty() {
        let req = LoginRequest {
            identifier: String::new(),
            password: "pw".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_oauth_request_validates_avatar_url() {
        let req = OAuthLoginRequest {
            email: "octo@github.com".to_string(),
            display_name: "octocat".to_string(),
            avatar_url: Some("not a url".to_string()),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_token_pair_serializes() {
        let pair = TokenPair {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        };
        let json = serde_json::to_string(&pair).unwrap();
        assert_eq!(json, r#"{"access_token":"a","refresh_token":"r"}"#);
    }
}
