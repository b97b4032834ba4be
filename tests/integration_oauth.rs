mod common;

use std::sync::Arc;
use std::time::Duration;

use warden::modules::auth::SessionService;
use warden::modules::oauth::OAuthService;
use warden::state::AppState;
use warden::warden_core::AuthError;
use warden::warden_models::{OAuthIdentity, OAuthProvider, SignupMethod};

use common::{PNG_HEADER, StaticAvatar, create_user, test_state};

fn identity(email: &str, display_name: &str) -> OAuthIdentity {
    OAuthIdentity {
        email: email.to_string(),
        display_name: display_name.to_string(),
        avatar_url: None,
    }
}

async fn wait_for_image(state: &AppState, user_id: uuid::Uuid) -> Option<Vec<u8>> {
    for _ in 0..50 {
        if let Some(image) = state.store.get_user_image(user_id).await.unwrap() {
            return Some(image);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    None
}

#[tokio::test]
async fn test_github_signup_then_login() {
    let (state, mut outbox) = test_state();

    let first = OAuthService::handle_oauth(
        &state,
        OAuthProvider::Github,
        identity("octo@example.com", "octocat"),
    )
    .await
    .unwrap();
    let user_id = SessionService::authenticate(&state, &first.access_token).unwrap();

    let user = state.store.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.username, "octocat");
    assert_eq!(user.signup_method, SignupMethod::Github);
    assert!(user.is_verified);
    assert!(state.store.get_user_password_by_id(user_id).await.unwrap().is_none());
    outbox
        .webhook_with(&format!("New user signed up with {}", OAuthProvider::Github))
        .await;

    // Matched by login, so a changed email still finds the account.
    let second = OAuthService::handle_oauth(
        &state,
        OAuthProvider::Github,
        identity("octo+new@example.com", "octocat"),
    )
    .await
    .unwrap();
    assert_eq!(
        SessionService::authenticate(&state, &second.access_token).unwrap(),
        user_id
    );
    assert!(matches!(
        SessionService::refresh(&state, &first.refresh_token).await,
        Err(AuthError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_google_is_matched_by_email() {
    let (state, _outbox) = test_state();

    let first = OAuthService::handle_oauth(
        &state,
        OAuthProvider::Google,
        identity("Ada@Example.com", "Ada Lovelace"),
    )
    .await
    .unwrap();
    let user_id = SessionService::authenticate(&state, &first.access_token).unwrap();
    let user = state.store.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.username, "Ada_Lovelace");
    assert_eq!(user.email, "ada@example.com");

    let second = OAuthService::handle_oauth(
        &state,
        OAuthProvider::Google,
        identity("ada@example.com", "Countess of Lovelace"),
    )
    .await
    .unwrap();
    assert_eq!(
        SessionService::authenticate(&state, &second.access_token).unwrap(),
        user_id
    );
}

#[tokio::test]
async fn test_existing_account_from_other_method_is_refused() {
    let (state, _outbox) = test_state();
    create_user(&state, "alice").await;

    assert!(matches!(
        OAuthService::handle_oauth(
            &state,
            OAuthProvider::Github,
            identity("someone@example.com", "alice"),
        )
        .await,
        Err(AuthError::InvalidSignupMethod)
    ));
    assert!(matches!(
        OAuthService::handle_oauth(
            &state,
            OAuthProvider::Google,
            identity("alice@example.com", "Alice"),
        )
        .await,
        Err(AuthError::InvalidSignupMethod)
    ));
}

#[tokio::test]
async fn test_cross_provider_account_is_refused() {
    let (state, _outbox) = test_state();
    OAuthService::handle_oauth(
        &state,
        OAuthProvider::Google,
        identity("dana@example.com", "Dana"),
    )
    .await
    .unwrap();

    assert!(matches!(
        OAuthService::handle_oauth(
            &state,
            OAuthProvider::Github,
            identity("dana@example.com", "Dana"),
        )
        .await,
        Err(AuthError::InvalidSignupMethod)
    ));
}

#[tokio::test]
async fn test_invalid_identity_is_rejected() {
    let (state, _outbox) = test_state();

    assert!(matches!(
        OAuthService::handle_oauth(
            &state,
            OAuthProvider::Github,
            identity("not-an-email", "octocat"),
        )
        .await,
        Err(AuthError::InvalidEmail)
    ));
    assert!(matches!(
        OAuthService::handle_oauth(
            &state,
            OAuthProvider::Github,
            identity("octo@example.com", "octo cat"),
        )
        .await,
        Err(AuthError::InvalidUsername)
    ));
}

#[tokio::test]
async fn test_avatar_is_stored_after_signup() {
    let (state, _outbox) = test_state();

    let tokens = OAuthService::handle_oauth(
        &state,
        OAuthProvider::Github,
        OAuthIdentity {
            avatar_url: Some("https://avatars.example.com/u/1".to_string()),
            ..identity("octo@example.com", "octocat")
        },
    )
    .await
    .unwrap();
    let user_id = SessionService::authenticate(&state, &tokens.access_token).unwrap();

    assert_eq!(wait_for_image(&state, user_id).await.unwrap(), PNG_HEADER);
}

#[tokio::test]
async fn test_avatar_failure_does_not_block_signup() {
    let (state, _outbox) = test_state();
    let state = state.with_avatar_fetcher(Arc::new(StaticAvatar(None)));

    let tokens = OAuthService::handle_oauth(
        &state,
        OAuthProvider::Github,
        OAuthIdentity {
            avatar_url: Some("https://avatars.example.com/u/1".to_string()),
            ..identity("octo@example.com", "octocat")
        },
    )
    .await
    .unwrap();
    let user_id = SessionService::authenticate(&state, &tokens.access_token).unwrap();

    assert!(wait_for_image(&state, user_id).await.is_none());
}
