//! Single-slot verification records keyed by an unguessable token.
//!
//! Each user holds at most one in-flight verification. Starting a new one
//! overwrites the slot, so an earlier token stops resolving. The ledger does not
//! expire slots itself; callers compare `expires_at` against the clock.

use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use warden_core::AuthError;
use warden_db::UserStore;
use warden_models::{VerificationDetails, VerificationKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub user_id: Uuid,
    pub kind: VerificationKind,
    pub pending_value: String,
    pub expires_at: DateTime<Utc>,
}

impl Resolved {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

pub struct VerificationLedger;

impl VerificationLedger {
    /// Writes a fresh slot for `user_id` and returns its token.
    pub async fn begin(
        store: &dyn UserStore,
        user_id: Uuid,
        kind: VerificationKind,
        pending_value: String,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let ttl = chrono::Duration::from_std(ttl).map_err(AuthError::internal)?;
        let details = VerificationDetails {
            kind,
            pending_value,
            token: Uuid::new_v4().to_string(),
            expires_at: Utc::now() + ttl,
        };

        store.set_user_verification_details(user_id, &details).await?;

        Ok(details.token)
    }

    pub async fn resolve(store: &dyn UserStore, token: &str) -> Result<Resolved, AuthError> {
        let (user_id, details) = store
            .get_verification_by_token(token)
            .await?
            .ok_or(AuthError::VerificationNotFound)?;

        Ok(Resolved {
            user_id,
            kind: details.kind,
            pending_value: details.pending_value,
            expires_at: details.expires_at,
        })
    }

    pub async fn clear(store: &dyn UserStore, user_id: Uuid) -> Result<(), AuthError> {
        store.clear_user_verification_details(user_id, None).await?;
        Ok(())
    }

    /// Clears the slot only if it still holds `token`.
    ///
    /// Of several callers presenting the same token, exactly one gets `Ok`.
    pub async fn consume(
        store: &dyn UserStore,
        user_id: Uuid,
        token: &str,
    ) -> Result<(), AuthError> {
        if store
            .clear_user_verification_details(user_id, Some(token))
            .await?
        {
            Ok(())
        } else {
            Err(AuthError::VerificationNotFound)
        }
    }
}
