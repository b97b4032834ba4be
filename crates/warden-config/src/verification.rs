use std::time::Duration;

use crate::env_or;

/// Lifetimes of single-use verification tokens.
#[derive(Clone, Debug)]
pub struct VerificationConfig {
    pub signup_ttl: Duration,
    /// Email, username and password changes.
    pub update_ttl: Duration,
    pub delete_ttl: Duration,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            signup_ttl: Duration::from_secs(3600),
            update_ttl: Duration::from_secs(900),
            delete_ttl: Duration::from_secs(3600),
        }
    }
}

impl VerificationConfig {
    pub fn from_env() -> Self {
        Self {
            signup_ttl: Duration::from_secs(env_or("VERIFY_SIGNUP_TTL_SECS", 3600)),
            update_ttl: Duration::from_secs(env_or("VERIFY_UPDATE_TTL_SECS", 900)),
            delete_ttl: Duration::from_secs(env_or("VERIFY_DELETE_TTL_SECS", 3600)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_window_is_shortest() {
        let config = VerificationConfig::default();
        assert!(config.update_ttl < config.signup_ttl);
        assert_eq!(config.signup_ttl, config.delete_ttl);
    }
}
