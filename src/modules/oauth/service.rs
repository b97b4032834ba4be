use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use warden_auth::TokenPair;
use warden_core::{AuthError, MAX_FIELD_LEN};
use warden_db::UserStore;
use warden_models::{NewUser, OAuthIdentity, OAuthProvider, Role};

use crate::metrics::{track_user_created, track_user_login_success};
use crate::modules::auth::service::SessionService;
use crate::modules::oauth::avatar::AvatarFetcher;
use crate::state::AppState;

pub struct OAuthService;

impl OAuthService {
    /// Logs in, or signs up and logs in, the account behind an identity the
    /// provider has already vouched for.
    ///
    /// GitHub accounts are matched by login, Google accounts by email. An
    /// existing account only matches if it was created through the same
    /// provider.
    #[instrument(skip(state, identity), fields(display_name = %identity.display_name))]
    pub async fn handle_oauth(
        state: &AppState,
        provider: OAuthProvider,
        identity: OAuthIdentity,
    ) -> Result<TokenPair, AuthError> {
        let email = state.rules.validate_email(&identity.email)?;

        let existing = if provider.keys_by_email() {
            state.store.get_user_id_by_email(&email).await?
        } else {
            state
                .store
                .get_user_id_by_username(&identity.display_name)
                .await?
        };

        if let Some(user_id) = existing {
            if state.store.get_signup_method(user_id).await? != provider.signup_method() {
                return Err(AuthError::InvalidSignupMethod);
            }

            let tokens = SessionService::login_by_identity(state, user_id).await?;
            info!(user_id = %user_id, provider = %provider, "OAuth login");
            track_user_login_success(provider.signup_method().as_str());
            return Ok(tokens);
        }

        let username = match provider {
            OAuthProvider::Github => identity.display_name.clone(),
            OAuthProvider::Google => username_from_display_name(&identity.display_name, &email),
        };
        state.rules.validate_username(&username)?;

        let user_id = state
            .store
            .add_user(NewUser {
                username: username.clone(),
                email,
                password_hash: None,
                role: Role::User,
                signup_method: provider.signup_method(),
                is_verified: true,
            })
            .await?;

        info!(user_id = %user_id, provider = %provider, "OAuth signup");
        track_user_created(provider.signup_method().as_str());

        if let Some(url) = identity.avatar_url.filter(|u| !u.is_empty()) {
            spawn_avatar_download(
                Arc::clone(&state.store),
                Arc::clone(&state.avatar_fetcher),
                user_id,
                url,
            );
        }

        state
            .dispatcher
            .webhook(&username, format!("New user signed up with {}", provider));

        let tokens = SessionService::login_by_identity(state, user_id).await?;
        track_user_login_success(provider.signup_method().as_str());
        Ok(tokens)
    }
}

/// Google display names are free text; make one usable as a username.
fn username_from_display_name(display_name: &str, email: &str) -> String {
    let candidate: String = display_name
        .trim()
        .chars()
        .filter(|c| *c != '@')
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .take(MAX_FIELD_LEN)
        .collect();

    if candidate.is_empty() {
        email.split('@').next().unwrap_or(email).to_string()
    } else {
        candidate
    }
}

fn spawn_avatar_download(
    store: Arc<dyn UserStore>,
    fetcher: Arc<dyn AvatarFetcher>,
    user_id: Uuid,
    url: String,
) {
    tokio::spawn(async move {
        let image = match fetcher.fetch(&url).await {
            Ok(image) => image,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Avatar download failed");
                return;
            }
        };
        if let Err(e) = store.set_user_image(user_id, &image).await {
            warn!(user_id = %user_id, error = %e, "Failed to store avatar");
        }
    });
}
