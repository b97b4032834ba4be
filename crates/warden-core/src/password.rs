use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AuthError;

/// Hashes a password with bcrypt at the default cost.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Hashes a password with an explicit bcrypt cost. The salt is random per call
/// and embedded in the returned string.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    hash(password, cost)
        .map_err(|e| AuthError::internal(anyhow::anyhow!("Failed to hash password: {}", e)))
}

/// Compares a password against a bcrypt hash.
///
/// A malformed hash compares as `false`; this never fails on caller input.
pub fn verify_password(password: &str, hash: &str) -> bool {
    verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcrypt::DEFAULT_COST;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password_with_cost("correct horse", TEST_COST).unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn test_malformed_hash_is_false() {
        assert!(!verify_password("anything", "not_a_bcrypt_hash"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_default_cost_hash() {
        let hash = hash_password("pw").unwrap();
        assert!(hash.contains(&format!("${}$", DEFAULT_COST)));
    }
}
