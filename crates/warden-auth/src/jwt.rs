//! Minting and validation of signed access and refresh tokens.
//!
//! Tokens are HS256 JWTs carrying `{sub, typ, iss, iat, exp, jti}`. Validation is
//! purely computational; whether a refresh token is still the *current* one is
//! decided by the session layer against the stored refresh-token slot.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use warden_config::JwtConfig;
use warden_core::AuthError;

use crate::claims::{TokenClaims, TokenKind, TokenPair};

#[derive(Clone)]
pub struct TokenCodec {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.config.issuer)
            .field("access_token_expiry", &self.config.access_token_expiry)
            .field("refresh_token_expiry", &self.config.refresh_token_expiry)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Mints a token of `kind` for `user_id` that expires at `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if encoding fails.
    pub fn mint(
        &self,
        user_id: Uuid,
        kind: TokenKind,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub: user_id.to_string(),
            typ: kind,
            iss: self.config.issuer.clone(),
            iat: Utc::now().timestamp().max(0) as usize,
            exp: expires_at.timestamp().max(0) as usize,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            AuthError::internal(anyhow::anyhow!("Failed to create {} token: {}", kind, e))
        })
    }

    /// Mints an access token and a refresh token with the configured lifetimes.
    pub fn mint_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_token = self.mint(
            user_id,
            TokenKind::Access,
            now + Duration::seconds(self.config.access_token_expiry),
        )?;
        let refresh_token = self.mint(
            user_id,
            TokenKind::Refresh,
            now + Duration::seconds(self.config.refresh_token_expiry),
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Validates a token and returns its subject and kind.
    ///
    /// # Errors
    ///
    /// - [`AuthError::EmptyToken`] for an empty string
    /// - [`AuthError::InvalidIssuer`] when `iss` is not this service's issuer
    /// - [`AuthError::InvalidToken`] when the token is malformed, badly signed,
    ///   expired, or names the nil user
    pub fn validate(&self, token: &str) -> Result<(Uuid, TokenKind), AuthError> {
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                _ => AuthError::InvalidToken,
            }
        })?;

        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken)?;
        if user_id.is_nil() {
            return Err(AuthError::InvalidToken);
        }

        Ok((user_id, data.claims.typ))
    }

    /// Validates a token and requires it to be of `expected` kind.
    pub fn validate_kind(&self, token: &str, expected: TokenKind) -> Result<Uuid, AuthError> {
        let (user_id, kind) = self.validate(token)?;
        if kind != expected {
            return Err(AuthError::InvalidTokenType);
        }
        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "warden-test".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
        }
    }

    #[test]
    fn test_mint_pair_round_trip() {
        let codec = TokenCodec::new(get_test_jwt_config());
        let user_id = Uuid::new_v4();

        let pair = codec.mint_pair(user_id).unwrap();

        assert_eq!(
            codec.validate(&pair.access_token).unwrap(),
            (user_id, TokenKind::Access)
        );
        assert_eq!(
            codec.validate(&pair.refresh_token).unwrap(),
            (user_id, TokenKind::Refresh)
        );
    }

    #[test]
    fn test_validate_kind_rejects_confusion() {
        let codec = TokenCodec::new(get_test_jwt_config());
        let pair = codec.mint_pair(Uuid::new_v4()).unwrap();

        assert!(matches!(
            codec.validate_kind(&pair.access_token, TokenKind::Refresh),
            Err(AuthError::InvalidTokenType)
        ));
        assert!(matches!(
            codec.validate_kind(&pair.refresh_token, TokenKind::Access),
            Err(AuthError::InvalidTokenType)
        ));
    }

    #[test]
    fn test_empty_token() {
        let codec = TokenCodec::new(get_test_jwt_config());
        assert!(matches!(codec.validate(""), Err(AuthError::EmptyToken)));
    }

    #[test]
    fn test_expired_token() {
        let codec = TokenCodec::new(get_test_jwt_config());
        let token = codec
            .mint(
                Uuid::new_v4(),
                TokenKind::Access,
                Utc::now() - Duration::minutes(10),
            )
            .unwrap();
        assert!(matches!(codec.validate(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret() {
        let codec = TokenCodec::new(get_test_jwt_config());
        let token = codec.mint_pair(Uuid::new_v4()).unwrap().access_token;

        let other = TokenCodec::new(JwtConfig {
            secret: "different-secret-key-at-least-32-characters".to_string(),
            ..get_test_jwt_config()
        });
        assert!(matches!(other.validate(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_wrong_issuer() {
        let foreign = TokenCodec::new(JwtConfig {
            issuer: "someone-else".to_string(),
            ..get_test_jwt_config()
        });
        let token = foreign.mint_pair(Uuid::new_v4()).unwrap().access_token;

        let codec = TokenCodec::new(get_test_jwt_config());
        assert!(matches!(codec.validate(&token), Err(AuthError::InvalidIssuer)));
    }

    #[test]
    fn test_nil_subject_rejected() {
        let codec = TokenCodec::new(get_test_jwt_config());
        let token = codec
            .mint(
                Uuid::nil(),
                TokenKind::Access,
                Utc::now() + Duration::minutes(5),
            )
            .unwrap();
        assert!(matches!(codec.validate(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = TokenCodec::new(get_test_jwt_config());
        for token in [
            "invalid-token",
            "not.enough.parts",
            "header.payload.",
            ".payload.signature",
        ] {
            assert!(matches!(codec.validate(token), Err(AuthError::InvalidToken)));
        }
    }

    #[test]
    fn test_same_second_tokens_differ() {
        let codec = TokenCodec::new(get_test_jwt_config());
        let user_id = Uuid::new_v4();
        let first = codec.mint_pair(user_id).unwrap();
        let second = codec.mint_pair(user_id).unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);
    }
}
