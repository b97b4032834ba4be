//! Request extractors.
//!
//! - [`auth`]: `AuthUser`, the bearer access-token extractor
//! - [`fingerprint`]: `ClientFingerprint`, a coarse device identifier used to
//!   flag logins from a new device
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! async fn get_profile(AuthUser(user_id): AuthUser) -> impl IntoResponse {
//!     // only reached with a valid access token
//! }
//! ```

pub mod auth;
pub mod fingerprint;
