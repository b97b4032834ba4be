//! Email-confirmed account changes.
//!
//! Every change runs in three phases: a request writes the pending value to the
//! ledger and mails a link, a confirm applies it, and for email changes and
//! account deletion a cancel discards it. Confirming a credential change or a
//! deletion also ends every session of the account.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use warden_core::{AuthError, verify_password};
use warden_models::{SignupMethod, User, VerificationKind};
use warden_notify::{EmailMessage, EmailTemplate};

use crate::metrics::track_verification;
use crate::modules::verification::ledger::{Resolved, VerificationLedger};
use crate::state::AppState;

pub struct VerificationService;

impl VerificationService {
    // Request phase

    #[instrument(skip(state, new_email))]
    pub async fn request_update_email(
        state: &AppState,
        user_id: Uuid,
        new_email: &str,
    ) -> Result<(), AuthError> {
        let new_email = state.rules.validate_email(new_email)?;
        let user = plain_user(state, user_id).await?;

        if user.email == new_email {
            return Err(AuthError::NoChange);
        }
        if state.store.user_exists_by_email(&new_email).await? {
            return Err(AuthError::DuplicateKey);
        }

        let kind = VerificationKind::UpdateEmail;
        let token = VerificationLedger::begin(
            state.store.as_ref(),
            user_id,
            kind,
            new_email.clone(),
            state.verification_config.update_ttl,
        )
        .await?;

        state.dispatcher.email(
            EmailMessage::new(&new_email, &user.username, EmailTemplate::ConfirmEmailChange)
                .with_link(
                    kind,
                    state.email_config.link("verify/email", &token),
                    &token,
                ),
        );
        // The old address can undo a change it did not ask for.
        state.dispatcher.email(
            EmailMessage::new(&user.email, &user.username, EmailTemplate::CancelEmailChange)
                .with_link(
                    kind,
                    state.email_config.link("verify/email/cancel", &token),
                    &token,
                ),
        );

        requested(user_id, kind);
        Ok(())
    }

    #[instrument(skip(state))]
    pub async fn request_update_username(
        state: &AppState,
        user_id: Uuid,
        new_username: &str,
    ) -> Result<(), AuthError> {
        state.rules.validate_username(new_username)?;
        let user = plain_user(state, user_id).await?;

        if user.username == new_username {
            return Err(AuthError::NoChange);
        }
        if state.store.user_exists(new_username).await? {
            return Err(AuthError::DuplicateKey);
        }

        let kind = VerificationKind::UpdateUsername;
        let token = VerificationLedger::begin(
            state.store.as_ref(),
            user_id,
            kind,
            new_username.to_string(),
            state.verification_config.update_ttl,
        )
        .await?;

        state.dispatcher.email(
            EmailMessage::new(&user.email, &user.username, EmailTemplate::ConfirmUsernameChange)
                .with_link(
                    kind,
                    state.email_config.link("verify/username", &token),
                    token,
                ),
        );

        requested(user_id, kind);
        Ok(())
    }

    /// The new password is hashed here; the ledger only ever holds the hash.
    #[instrument(skip(state, current_password, new_password))]
    pub async fn request_update_password(
        state: &AppState,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        state.rules.check_credentials(current_password, new_password)?;
        let user = plain_user(state, user_id).await?;

        let current_hash = state
            .store
            .get_user_password_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidSignupMethod)?;

        if !verify_password(current_password, &current_hash) {
            return Err(AuthError::IncorrectPassword);
        }
        if current_password == new_password {
            return Err(AuthError::NoChange);
        }

        let kind = VerificationKind::UpdatePassword;
        let token = VerificationLedger::begin(
            state.store.as_ref(),
            user_id,
            kind,
            state.hash_password(new_password)?,
            state.verification_config.update_ttl,
        )
        .await?;

        state.dispatcher.email(
            EmailMessage::new(&user.email, &user.username, EmailTemplate::ConfirmPasswordChange)
                .with_link(
                    kind,
                    state.email_config.link("verify/password", &token),
                    token,
                ),
        );

        requested(user_id, kind);
        Ok(())
    }

    /// Available to every signup method.
    #[instrument(skip(state))]
    pub async fn request_delete_account(state: &AppState, user_id: Uuid) -> Result<(), AuthError> {
        let user = existing_user(state, user_id).await?;

        let kind = VerificationKind::DeleteAccount;
        let token = VerificationLedger::begin(
            state.store.as_ref(),
            user_id,
            kind,
            String::new(),
            state.verification_config.delete_ttl,
        )
        .await?;

        state.dispatcher.email(
            EmailMessage::new(&user.email, &user.username, EmailTemplate::ConfirmAccountDeletion)
                .with_link(
                    kind,
                    state.email_config.link("verify/delete", &token),
                    &token,
                ),
        );
        state.dispatcher.email(
            EmailMessage::new(&user.email, &user.username, EmailTemplate::CancelAccountDeletion)
                .with_link(
                    kind,
                    state.email_config.link("verify/delete/cancel", &token),
                    &token,
                ),
        );

        requested(user_id, kind);
        Ok(())
    }

    // Confirm phase

    #[instrument(skip_all)]
    pub async fn confirm_signup(state: &AppState, token: &str) -> Result<(), AuthError> {
        let resolved = confirm(state, token, VerificationKind::Signup).await?;

        state.store.set_is_verified(resolved.user_id, true).await?;

        info!(user_id = %resolved.user_id, "Signup confirmed");
        if let Some(user) = state.store.get_user(resolved.user_id).await? {
            state.dispatcher.webhook(&user.username, "Account verified");
        }
        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn confirm_update_email(state: &AppState, token: &str) -> Result<(), AuthError> {
        let resolved = confirm(state, token, VerificationKind::UpdateEmail).await?;

        state
            .store
            .set_user_email(resolved.user_id, &resolved.pending_value)
            .await?;
        applied(state, &resolved, "Email address changed").await
    }

    #[instrument(skip_all)]
    pub async fn confirm_update_username(state: &AppState, token: &str) -> Result<(), AuthError> {
        let resolved = confirm(state, token, VerificationKind::UpdateUsername).await?;

        state
            .store
            .set_username(resolved.user_id, &resolved.pending_value)
            .await?;
        applied(state, &resolved, "Username changed").await
    }

    #[instrument(skip_all)]
    pub async fn confirm_update_password(state: &AppState, token: &str) -> Result<(), AuthError> {
        let resolved = confirm(state, token, VerificationKind::UpdatePassword).await?;

        state
            .store
            .set_user_password(resolved.user_id, &resolved.pending_value)
            .await?;
        applied(state, &resolved, "Password changed").await
    }

    #[instrument(skip_all)]
    pub async fn confirm_delete_account(state: &AppState, token: &str) -> Result<(), AuthError> {
        let resolved = confirm(state, token, VerificationKind::DeleteAccount).await?;

        let user = state.store.get_user(resolved.user_id).await?;
        state.store.delete_user(resolved.user_id).await?;

        info!(user_id = %resolved.user_id, "Account deleted");
        if let Some(user) = user {
            state.dispatcher.webhook(&user.username, "Account deleted");
        }
        Ok(())
    }

    // Cancel phase

    /// Discards a pending email change. Sessions are ended too, since the
    /// owner of the old address is reclaiming the account.
    #[instrument(skip_all)]
    pub async fn cancel_update_email(state: &AppState, token: &str) -> Result<(), AuthError> {
        let resolved = cancel(state, token, VerificationKind::UpdateEmail).await?;

        state.store.set_refresh_token(resolved.user_id, "").await?;

        if let Some(user) = state.store.get_user(resolved.user_id).await? {
            state
                .dispatcher
                .webhook(&user.username, "Email change cancelled");
        }
        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn cancel_delete_account(state: &AppState, token: &str) -> Result<(), AuthError> {
        let resolved = cancel(state, token, VerificationKind::DeleteAccount).await?;

        if let Some(user) = state.store.get_user(resolved.user_id).await? {
            state
                .dispatcher
                .webhook(&user.username, "Account deletion cancelled");
        }
        Ok(())
    }
}

async fn existing_user(state: &AppState, user_id: Uuid) -> Result<User, AuthError> {
    state
        .store
        .get_user(user_id)
        .await?
        .ok_or(AuthError::NoUserFound)
}

/// Credential changes are only offered to password accounts.
async fn plain_user(state: &AppState, user_id: Uuid) -> Result<User, AuthError> {
    let user = existing_user(state, user_id).await?;
    if user.signup_method != SignupMethod::Plain {
        return Err(AuthError::InvalidSignupMethod);
    }
    Ok(user)
}

fn requested(user_id: Uuid, kind: VerificationKind) {
    info!(user_id = %user_id, kind = %kind, "Verification requested");
    track_verification(kind.as_str(), "requested");
}

async fn resolve_kind(
    state: &AppState,
    token: &str,
    expected: VerificationKind,
) -> Result<Resolved, AuthError> {
    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }

    let resolved = VerificationLedger::resolve(state.store.as_ref(), token).await?;
    if resolved.kind != expected {
        return Err(AuthError::InvalidVerificationType);
    }
    Ok(resolved)
}

/// Resolves, checks kind and expiry, then consumes the token. Only the caller
/// that wins the consume goes on to apply the change.
async fn confirm(
    state: &AppState,
    token: &str,
    expected: VerificationKind,
) -> Result<Resolved, AuthError> {
    let resolved = resolve_kind(state, token, expected).await?;
    if resolved.is_expired_at(Utc::now()) {
        return Err(AuthError::InvalidToken);
    }

    VerificationLedger::consume(state.store.as_ref(), resolved.user_id, token).await?;
    track_verification(expected.as_str(), "confirmed");
    Ok(resolved)
}

async fn cancel(
    state: &AppState,
    token: &str,
    expected: VerificationKind,
) -> Result<Resolved, AuthError> {
    let resolved = resolve_kind(state, token, expected).await?;

    VerificationLedger::consume(state.store.as_ref(), resolved.user_id, token).await?;
    info!(user_id = %resolved.user_id, kind = %expected, "Verification cancelled");
    track_verification(expected.as_str(), "cancelled");
    Ok(resolved)
}

/// Ends every session and tells the account owner an update went through.
async fn applied(state: &AppState, resolved: &Resolved, event: &str) -> Result<(), AuthError> {
    debug_assert!(resolved.kind.revokes_sessions());
    state.store.set_refresh_token(resolved.user_id, "").await?;

    info!(user_id = %resolved.user_id, kind = %resolved.kind, "Verified change applied");
    if let Some(user) = state.store.get_user(resolved.user_id).await? {
        state.dispatcher.email(EmailMessage::new(
            &user.email,
            &user.username,
            EmailTemplate::ChangeApplied,
        ));
        state.dispatcher.webhook(&user.username, event);
    }
    Ok(())
}
