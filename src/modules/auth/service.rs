use tracing::{info, instrument, warn};
use uuid::Uuid;

use warden_auth::{TokenKind, TokenPair};
use warden_core::{AuthError, StoreError, verify_password};
use warden_models::{NewUser, Role, SignupMethod, User, VerificationKind};
use warden_notify::{EmailMessage, EmailTemplate};

use crate::metrics::{
    track_jwt_issued, track_user_created, track_user_login_failure, track_user_login_success,
    track_verification,
};
use crate::modules::verification::ledger::VerificationLedger;
use crate::state::AppState;

pub struct SessionService;

impl SessionService {
    /// Creates a verified plain account that can log in immediately.
    #[instrument(skip(state, email, password))]
    pub async fn signup(
        state: &AppState,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Uuid, AuthError> {
        let email = validate_signup(state, username, email, password)?;
        let password_hash = state.hash_password(password)?;

        let user_id = state
            .store
            .add_user(NewUser {
                username: username.to_string(),
                email,
                password_hash: Some(password_hash),
                role,
                signup_method: SignupMethod::Plain,
                is_verified: true,
            })
            .await?;

        info!(user_id = %user_id, "User signed up");
        track_user_created(SignupMethod::Plain.as_str());
        state.dispatcher.webhook(username, "New user signed up");

        Ok(user_id)
    }

    /// Creates an unverified plain account and emails a confirmation link.
    ///
    /// Signing up again with the email of an account that was never confirmed
    /// re-issues the link for that account instead of failing.
    #[instrument(skip(state, email, password))]
    pub async fn signup_with_verification(
        state: &AppState,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Uuid, AuthError> {
        let email = validate_signup(state, username, email, password)?;
        let password_hash = state.hash_password(password)?;

        let created = state
            .store
            .add_user(NewUser {
                username: username.to_string(),
                email: email.clone(),
                password_hash: Some(password_hash),
                role,
                signup_method: SignupMethod::Plain,
                is_verified: false,
            })
            .await;

        let user_id = match created {
            Ok(user_id) => {
                info!(user_id = %user_id, "User signed up, awaiting verification");
                track_user_created(SignupMethod::Plain.as_str());
                user_id
            }
            Err(StoreError::DuplicateKey) => {
                let Some(existing) = state.store.get_user_id_by_email(&email).await? else {
                    return Err(AuthError::DuplicateKey);
                };
                if state.store.get_is_verified(existing).await? {
                    return Err(AuthError::DuplicateKey);
                }
                info!(user_id = %existing, "Restarting signup verification");
                existing
            }
            Err(e) => return Err(e.into()),
        };

        let user = state
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::NoUserFound)?;
        send_signup_link(state, &user).await?;

        Ok(user_id)
    }

    #[instrument(skip(state, password, fingerprint))]
    pub async fn login(
        state: &AppState,
        identifier: &str,
        password: &str,
        fingerprint: Option<&str>,
    ) -> Result<TokenPair, AuthError> {
        state.rules.check_credentials(identifier, password)?;

        let credentials = if state.rules.is_email(identifier) {
            state
                .store
                .get_user_password_and_id_by_email(&identifier.to_lowercase())
                .await?
        } else {
            state
                .store
                .get_user_password_and_id_by_username(identifier)
                .await?
        };

        let Some(credentials) = credentials else {
            track_user_login_failure("no_user");
            return Err(AuthError::NoUserFound);
        };

        let Some(password_hash) = credentials.password_hash else {
            track_user_login_failure("federated_account");
            return Err(AuthError::InvalidSignupMethod);
        };

        if !state.store.get_is_verified(credentials.id).await? {
            track_user_login_failure("not_verified");
            return Err(AuthError::NotVerified);
        }

        if !verify_password(password, &password_hash) {
            track_user_login_failure("incorrect_password");
            return Err(AuthError::IncorrectPassword);
        }

        let tokens = Self::start_session(state, credentials.id).await?;

        if let Some(user) = state.store.get_user(credentials.id).await? {
            if let Err(e) = check_fingerprint(state, &user, fingerprint).await {
                warn!(user_id = %user.id, error = %e, "Fingerprint check failed");
            }
            state.dispatcher.webhook(&user.username, "Login successful");
        }

        info!(user_id = %credentials.id, "User logged in");
        track_user_login_success(SignupMethod::Plain.as_str());

        Ok(tokens)
    }

    /// Exchanges the current refresh token for a new pair. The presented token
    /// stops working as soon as this succeeds.
    #[instrument(skip_all)]
    pub async fn refresh(state: &AppState, refresh_token: &str) -> Result<TokenPair, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::EmptyToken);
        }

        let user_id = state.codec.validate_kind(refresh_token, TokenKind::Refresh)?;
        let tokens = state.codec.mint_pair(user_id)?;

        match state
            .store
            .rotate_refresh_token(user_id, refresh_token, &tokens.refresh_token)
            .await
        {
            Ok(true) => {}
            Ok(false) | Err(StoreError::NotFound) => return Err(AuthError::InvalidToken),
            Err(e) => return Err(e.into()),
        }

        track_jwt_issued();
        Ok(tokens)
    }

    /// Ends every session of the user. Logging out twice is not an error.
    #[instrument(skip(state))]
    pub async fn logout(state: &AppState, user_id: Uuid) -> Result<(), AuthError> {
        match state.store.set_refresh_token(user_id, "").await {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Validates an access token and returns its subject.
    pub fn authenticate(state: &AppState, access_token: &str) -> Result<Uuid, AuthError> {
        state.codec.validate_kind(access_token, TokenKind::Access)
    }

    /// Starts a session without a password check. Only for identities already
    /// vouched for by an OAuth provider.
    #[instrument(skip(state))]
    pub async fn login_by_identity(state: &AppState, user_id: Uuid) -> Result<TokenPair, AuthError> {
        Self::start_session(state, user_id).await
    }

    async fn start_session(state: &AppState, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let tokens = state.codec.mint_pair(user_id)?;
        state
            .store
            .set_refresh_token(user_id, &tokens.refresh_token)
            .await?;
        track_jwt_issued();
        Ok(tokens)
    }
}

/// Returns the stored form of the email.
fn validate_signup(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<String, AuthError> {
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AuthError::EmptyCredentials);
    }
    state.rules.validate_username(username)?;
    let email = state.rules.validate_email(email)?;
    state.rules.validate_password(password)?;
    Ok(email)
}

async fn send_signup_link(state: &AppState, user: &User) -> Result<(), AuthError> {
    let token = VerificationLedger::begin(
        state.store.as_ref(),
        user.id,
        VerificationKind::Signup,
        String::new(),
        state.verification_config.signup_ttl,
    )
    .await?;

    state.dispatcher.email(
        EmailMessage::new(&user.email, &user.username, EmailTemplate::ConfirmSignup).with_link(
            VerificationKind::Signup,
            state.email_config.link("verify/signup", &token),
            token,
        ),
    );
    track_verification(VerificationKind::Signup.as_str(), "requested");

    Ok(())
}

/// Remembers the first device seen and flags logins from any other.
async fn check_fingerprint(
    state: &AppState,
    user: &User,
    fingerprint: Option<&str>,
) -> Result<(), AuthError> {
    let Some(fingerprint) = fingerprint.filter(|f| !f.is_empty()) else {
        return Ok(());
    };

    match state.store.get_login_fingerprint(user.id).await? {
        None => {
            state
                .store
                .set_login_fingerprint(user.id, fingerprint)
                .await?
        }
        Some(known) if known == fingerprint => {}
        Some(_) => {
            info!(user_id = %user.id, "Login from new device");
            state.dispatcher.email(EmailMessage::new(
                &user.email,
                &user.username,
                EmailTemplate::NewLogin,
            ));
            state
                .dispatcher
                .webhook(&user.username, "Login from an unrecognized device");
        }
    }

    Ok(())
}
