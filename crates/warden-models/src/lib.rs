//! # Warden Models
//!
//! Domain models and request/response DTOs shared by the store, the engine and
//! the HTTP binding.
//!
//! - [`users`]: [`User`], [`Role`], [`SignupMethod`] and store input types
//! - [`verification`]: the single-slot [`VerificationDetails`] record and its [`VerificationKind`]
//! - [`oauth`]: federated identity assertions
//! - [`auth`]: JSON request and response bodies

pub mod auth;
pub mod oauth;
pub mod users;
pub mod verification;

pub use oauth::{OAuthIdentity, OAuthProvider};
pub use users::{NewUser, Role, SignupMethod, User, UserCredentials};
pub use verification::{VerificationDetails, VerificationKind};
