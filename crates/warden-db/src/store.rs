//! The persistence capability required by the engine.
//!
//! Every per-user resource (refresh-token slot, verification slot, fingerprint,
//! image) is a single row or column; implementations must make each method a
//! single atomic write. Unique-constraint violations surface as
//! [`StoreError::DuplicateKey`]; writes and scalar reads against a missing user
//! return [`StoreError::NotFound`]. Email arguments are matched case-insensitively.

use async_trait::async_trait;
use uuid::Uuid;

use warden_core::StoreError;
use warden_models::{NewUser, SignupMethod, User, UserCredentials, VerificationDetails};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the user and, when a password hash is present, its credential
    /// record in one transaction.
    async fn add_user(&self, user: NewUser) -> Result<Uuid, StoreError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn get_user_password_and_id_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, StoreError>;

    async fn get_user_password_and_id_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, StoreError>;

    /// `Ok(None)` for an existing user without a password (federated).
    async fn get_user_password_by_id(&self, id: Uuid) -> Result<Option<String>, StoreError>;

    async fn set_user_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError>;

    async fn set_user_email(&self, id: Uuid, email: &str) -> Result<(), StoreError>;

    async fn set_username(&self, id: Uuid, username: &str) -> Result<(), StoreError>;

    /// Removes the user and everything that hangs off it.
    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError>;

    async fn get_is_verified(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn set_is_verified(&self, id: Uuid, verified: bool) -> Result<(), StoreError>;

    async fn get_signup_method(&self, id: Uuid) -> Result<SignupMethod, StoreError>;

    async fn set_signup_method(&self, id: Uuid, method: SignupMethod) -> Result<(), StoreError>;

    /// The current refresh token; empty when no session is active.
    async fn get_refresh_token(&self, id: Uuid) -> Result<String, StoreError>;

    /// Overwrites the refresh-token slot. An empty string revokes every session.
    async fn set_refresh_token(&self, id: Uuid, token: &str) -> Result<(), StoreError>;

    /// Replaces the slot with `next` only if it still holds `current`.
    /// Returns whether the swap happened.
    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, StoreError>;

    /// Overwrites the user's single verification slot.
    async fn set_user_verification_details(
        &self,
        id: Uuid,
        details: &VerificationDetails,
    ) -> Result<(), StoreError>;

    async fn get_user_verification_details(
        &self,
        id: Uuid,
    ) -> Result<Option<VerificationDetails>, StoreError>;

    async fn get_verification_by_token(
        &self,
        token: &str,
    ) -> Result<Option<(Uuid, VerificationDetails)>, StoreError>;

    /// Empties the verification slot. With `Some(token)` the slot is only
    /// emptied if it still holds that token. Returns whether a slot was cleared.
    async fn clear_user_verification_details(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<bool, StoreError>;

    async fn get_login_fingerprint(&self, id: Uuid) -> Result<Option<String>, StoreError>;

    async fn set_login_fingerprint(&self, id: Uuid, fingerprint: &str) -> Result<(), StoreError>;

    async fn get_user_image(&self, id: Uuid) -> Result<Option<Vec<u8>>, StoreError>;

    async fn set_user_image(&self, id: Uuid, image: &[u8]) -> Result<(), StoreError>;

    async fn user_exists(&self, username: &str) -> Result<bool, StoreError>;

    async fn user_exists_by_email(&self, email: &str) -> Result<bool, StoreError>;

    async fn get_user_id_by_username(&self, username: &str) -> Result<Option<Uuid>, StoreError>;

    async fn get_user_id_by_email(&self, email: &str) -> Result<Option<Uuid>, StoreError>;
}
