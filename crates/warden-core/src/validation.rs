//! Field rules for identifiers, emails, usernames and passwords.
//!
//! [`FieldRules`] is built once at startup and carried on application state so the
//! compiled email pattern is shared without a process-wide singleton.

use regex::Regex;

use crate::errors::AuthError;

/// Maximum accepted length of any identifier, email, username or password.
pub const MAX_FIELD_LEN: usize = 254;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$";

#[derive(Clone, Debug)]
pub struct FieldRules {
    email: Regex,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            email: Regex::new(EMAIL_PATTERN).expect("email pattern must compile"),
        }
    }
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a login identifier should be treated as an email address.
    /// Anything else is a username.
    pub fn is_email(&self, identifier: &str) -> bool {
        self.email.is_match(identifier)
    }

    /// Validates an email and returns its stored (lower-cased) form.
    pub fn validate_email(&self, email: &str) -> Result<String, AuthError> {
        let email = email.trim();
        check_present(email)?;
        if !self.is_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        Ok(email.to_lowercase())
    }

    /// Usernames are case-sensitive, may not contain whitespace, and may not
    /// contain `@` so they never classify as an email at login.
    pub fn validate_username(&self, username: &str) -> Result<(), AuthError> {
        check_present(username)?;
        if username.contains('@') || username.chars().any(char::is_whitespace) {
            return Err(AuthError::InvalidUsername);
        }
        Ok(())
    }

    pub fn validate_password(&self, password: &str) -> Result<(), AuthError> {
        check_present(password)
    }

    /// Login-time check applied before any lookup.
    pub fn check_credentials(&self, identifier: &str, password: &str) -> Result<(), AuthError> {
        if identifier.is_empty() || password.is_empty() {
            return Err(AuthError::EmptyCredentials);
        }
        if identifier.chars().count() > MAX_FIELD_LEN || password.chars().count() > MAX_FIELD_LEN
        {
            return Err(AuthError::TooLong);
        }
        Ok(())
    }
}

fn check_present(value: &str) -> Result<(), AuthError> {
    if value.is_empty() {
        return Err(AuthError::EmptyCredentials);
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(AuthError::TooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_classification() {
        let rules = FieldRules::new();
        assert!(rules.is_email("alice@x.com"));
        assert!(rules.is_email("first.last+tag@mail.example.co.uk"));
        assert!(!rules.is_email("alice"));
        assert!(!rules.is_email("alice@localhost"));
        assert!(!rules.is_email("alice@x.c"));
    }

    #[test]
    fn test_validate_email_lowercases() {
        let rules = FieldRules::new();
        assert_eq!(
            rules.validate_email("Alice@Example.COM").unwrap(),
            "alice@example.com"
        );
    }

    #[test]
    fn test_validate_email_rejects_garbage() {
        let rules = FieldRules::new();
        assert!(matches!(
            rules.validate_email("not-an-email"),
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            rules.validate_email(""),
            Err(AuthError::EmptyCredentials)
        ));
    }

    #[test]
    fn test_validate_email_too_long() {
        let rules = FieldRules::new();
        let email = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(rules.validate_email(&email), Err(AuthError::TooLong)));
    }

    #[test]
    fn test_validate_username() {
        let rules = FieldRules::new();
        assert!(rules.validate_username("alice_01").is_ok());
        assert!(matches!(
            rules.validate_username("al ice"),
            Err(AuthError::InvalidUsername)
        ));
        assert!(matches!(
            rules.validate_username("alice@x.com"),
            Err(AuthError::InvalidUsername)
        ));
        assert!(matches!(
            rules.validate_username(&"a".repeat(255)),
            Err(AuthError::TooLong)
        ));
    }

    #[test]
    fn test_check_credentials() {
        let rules = FieldRules::new();
        assert!(rules.check_credentials("alice", "pw").is_ok());
        assert!(matches!(
            rules.check_credentials("", "pw"),
            Err(AuthError::EmptyCredentials)
        ));
        assert!(matches!(
            rules.check_credentials("alice", ""),
            Err(AuthError::EmptyCredentials)
        ));
        assert!(matches!(
            rules.check_credentials("alice", &"p".repeat(255)),
            Err(AuthError::TooLong)
        ));
    }
}
