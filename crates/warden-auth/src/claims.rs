//! JWT claim structures for access and refresh tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use warden_core::AuthError;

/// Which role a token plays. Signed into every token as the `typ` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenKind::Access),
            "refresh" => Ok(TokenKind::Refresh),
            _ => Err(AuthError::InvalidTokenType),
        }
    }
}

/// JWT payload shared by access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID (subject claim)
    pub sub: String,
    /// Token kind
    pub typ: TokenKind,
    /// Issuer, checked against the configured issuer on validation
    pub iss: String,
    /// Issued-at (Unix timestamp)
    pub iat: usize,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Unique token identifier so two tokens minted in the same second differ
    pub jti: String,
}

/// An access/refresh token pair returned by login, refresh and federation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_lowercase() {
        let claims = TokenClaims {
            sub: "user-id-123".to_string(),
            typ: TokenKind::Refresh,
            iss: "warden".to_string(),
            iat: 1234567800,
            exp: 1234567890,
            jti: "jti-1".to_string(),
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""typ":"refresh""#));
        assert!(serialized.contains(r#""iss":"warden""#));
    }

    #[test]
    fn test_unknown_kind_fails_to_deserialize() {
        let json = r#"{"sub":"u","typ":"admin","iss":"warden","iat":1,"exp":2,"jti":"j"}"#;
        assert!(serde_json::from_str::<TokenClaims>(json).is_err());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("access".parse::<TokenKind>().unwrap(), TokenKind::Access);
        assert_eq!("refresh".parse::<TokenKind>().unwrap(), TokenKind::Refresh);
        assert!(matches!(
            "bearer".parse::<TokenKind>(),
            Err(AuthError::InvalidTokenType)
        ));
    }
}
