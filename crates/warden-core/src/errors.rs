//! Error types for the token and verification engine.
//!
//! [`AuthError`] variants are sentinels: callers and tests match on the variant,
//! never on the message. Infrastructure failures carry an opaque [`anyhow::Error`].

use thiserror::Error;

use crate::validation::MAX_FIELD_LEN;

/// Errors surfaced by a `UserStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint (username, email, verification token) was violated.
    #[error("Duplicate key")]
    DuplicateKey,

    /// The addressed user row does not exist.
    #[error("Record not found")]
    NotFound,

    #[error("Storage backend error: {0}")]
    Backend(anyhow::Error),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Backend(err.into())
    }
}

/// Every failure the engine reports to its caller.
#[derive(Debug, Error)]
pub enum AuthError {
    // Input validation
    #[error("Identifier and password are required")]
    EmptyCredentials,

    #[error("Field exceeds the maximum length of {max} characters", max = MAX_FIELD_LEN)]
    TooLong,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid username")]
    InvalidUsername,

    #[error("Unknown role")]
    InvalidRole,

    // Authentication
    #[error("No user found")]
    NoUserFound,

    #[error("Account is not verified")]
    NotVerified,

    #[error("Incorrect password")]
    IncorrectPassword,

    // Authorization / state
    #[error("Operation is not available for this signup method")]
    InvalidSignupMethod,

    #[error("Verification token does not match this operation")]
    InvalidVerificationType,

    #[error("New value is the same as the current value")]
    NoChange,

    // Token lifecycle
    #[error("Token is empty")]
    EmptyToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token issuer is not trusted")]
    InvalidIssuer,

    #[error("Invalid token type")]
    InvalidTokenType,

    #[error("Verification not found")]
    VerificationNotFound,

    // Conflict
    #[error("Username or email already in use")]
    DuplicateKey,

    // Infrastructure
    #[error("Storage error: {0}")]
    Store(anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(anyhow::Error),
}

impl AuthError {
    pub fn internal<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Internal(err.into())
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey => AuthError::DuplicateKey,
            StoreError::NotFound => AuthError::NoUserFound,
            StoreError::Backend(e) => AuthError::Store(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_duplicate_maps_to_duplicate_key() {
        let err: AuthError = StoreError::DuplicateKey.into();
        assert!(matches!(err, AuthError::DuplicateKey));
    }

    #[test]
    fn test_store_not_found_maps_to_no_user() {
        let err: AuthError = StoreError::NotFound.into();
        assert!(matches!(err, AuthError::NoUserFound));
    }

    #[test]
    fn test_backend_error_keeps_message() {
        let err: AuthError = StoreError::backend(anyhow::anyhow!("connection reset")).into();
        assert!(matches!(err, AuthError::Store(_)));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_too_long_mentions_limit() {
        assert!(AuthError::TooLong.to_string().contains("254"));
    }
}
