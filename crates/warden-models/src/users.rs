//! User identity records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(AuthError::InvalidRole),
        }
    }
}

/// How an account was created. Only `Plain` accounts hold a password and may
/// change their credentials through the verified-update flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignupMethod {
    Plain,
    Github,
    Google,
}

impl SignupMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignupMethod::Plain => "plain",
            SignupMethod::Github => "github",
            SignupMethod::Google => "google",
        }
    }
}

impl fmt::Display for SignupMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignupMethod {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(SignupMethod::Plain),
            "github" => Ok(SignupMethod::Github),
            "google" => Ok(SignupMethod::Google),
            _ => Err(AuthError::InvalidSignupMethod),
        }
    }
}

/// A user as returned to callers. Never carries credentials or tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub signup_method: SignupMethod,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Input to `UserStore::add_user`. The user row and its credential row are
/// written in one transaction.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// Already lower-cased.
    pub email: String,
    /// `None` for federated accounts.
    pub password_hash: Option<String>,
    pub role: Role,
    pub signup_method: SignupMethod,
    pub is_verified: bool,
}

/// Result of a credential lookup at login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: Uuid,
    pub password_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::User, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!(matches!("root".parse::<Role>(), Err(AuthError::InvalidRole)));
    }

    #[test]
    fn test_signup_method_parse() {
        assert_eq!("github".parse::<SignupMethod>().unwrap(), SignupMethod::Github);
        assert!("twitter".parse::<SignupMethod>().is_err());
    }

    #[test]
    fn test_user_serializes_without_secrets() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            role: Role::User,
            signup_method: SignupMethod::Plain,
            is_verified: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains(r#""signup_method":"plain""#));
        assert!(!json.contains("password"));
    }
}
