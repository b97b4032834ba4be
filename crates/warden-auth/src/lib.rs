//! # Warden Auth
//!
//! Typed, expiring, signed tokens bound to a user identity.
//!
//! - [`claims`]: the [`TokenClaims`] payload and the [`TokenKind`] tag
//! - [`jwt`]: [`TokenCodec`], which mints and validates access and refresh tokens
//!
//! The kind tag lives inside the signed payload. An access token presented where a
//! refresh token is required (or the reverse) is rejected with
//! [`AuthError::InvalidTokenType`](warden_core::AuthError::InvalidTokenType).
//!
//! # Example
//!
//! ```ignore
//! use warden_auth::{TokenCodec, TokenKind};
//! use warden_config::JwtConfig;
//!
//! let codec = TokenCodec::new(JwtConfig::from_env());
//! let pair = codec.mint_pair(user_id)?;
//! let (subject, kind) = codec.validate(&pair.access_token)?;
//! assert_eq!(kind, TokenKind::Access);
//! ```

pub mod claims;
pub mod jwt;

pub use claims::{TokenClaims, TokenKind, TokenPair};
pub use jwt::TokenCodec;
