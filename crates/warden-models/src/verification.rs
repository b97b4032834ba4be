//! The in-flight verification record. Each user has at most one.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationKind {
    Signup,
    UpdateEmail,
    UpdateUsername,
    UpdatePassword,
    DeleteAccount,
}

impl VerificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationKind::Signup => "signup",
            VerificationKind::UpdateEmail => "update-email",
            VerificationKind::UpdateUsername => "update-username",
            VerificationKind::UpdatePassword => "update-password",
            VerificationKind::DeleteAccount => "delete-account",
        }
    }

    /// Kinds whose confirmation must end every active session.
    pub fn revokes_sessions(&self) -> bool {
        !matches!(self, VerificationKind::Signup)
    }
}

impl fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationKind {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup" => Ok(VerificationKind::Signup),
            "update-email" => Ok(VerificationKind::UpdateEmail),
            "update-username" => Ok(VerificationKind::UpdateUsername),
            "update-password" => Ok(VerificationKind::UpdatePassword),
            "delete-account" => Ok(VerificationKind::DeleteAccount),
            _ => Err(AuthError::InvalidVerificationType),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationDetails {
    pub kind: VerificationKind,
    /// New email, new username or new password hash; empty for signup and
    /// account deletion.
    pub pending_value: String,
    /// Single-use, globally unique lookup key.
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl VerificationDetails {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
