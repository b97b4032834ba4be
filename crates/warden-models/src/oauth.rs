use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use warden_core::AuthError;

use crate::users::SignupMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Github,
    Google,
}

impl OAuthProvider {
    pub fn signup_method(&self) -> SignupMethod {
        match self {
            OAuthProvider::Github => SignupMethod::Github,
            OAuthProvider::Google => SignupMethod::Google,
        }
    }

    /// GitHub accounts are keyed by login, Google accounts by email.
    pub fn keys_by_email(&self) -> bool {
        matches!(self, OAuthProvider::Google)
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signup_method().as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(OAuthProvider::Github),
            "google" => Ok(OAuthProvider::Google),
            _ => Err(AuthError::InvalidSignupMethod),
        }
    }
}

/// What a provider's code exchange yields about the person signing in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthIdentity {
    pub email: String,
    /// GitHub login or Google display name.
    pub display_name: String,
    pub avatar_url: Option<String>,
}
