use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use warden_models::Role;
use warden_models::auth::{
    LoginRequest, MessageResponse, RefreshTokenRequest, SignupRequest, SignupResponse, TokenPair,
};

use crate::middleware::auth::AuthUser;
use crate::middleware::fingerprint::ClientFingerprint;
use crate::modules::auth::service::SessionService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

#[instrument(skip(state, dto), fields(username = %dto.username))]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    // Only the CLI creates accounts with elevated roles.
    let role = Role::default();

    let user_id = if dto.require_verification {
        SessionService::signup_with_verification(
            &state,
            &dto.username,
            &dto.email,
            &dto.password,
            role,
        )
        .await?
    } else {
        SessionService::signup(&state, &dto.username, &dto.email, &dto.password, role).await?
    };

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user_id,
            verification_required: dto.require_verification,
        }),
    ))
}

#[instrument(skip(state, fingerprint, dto))]
pub async fn login(
    State(state): State<AppState>,
    fingerprint: ClientFingerprint,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let tokens = SessionService::login(
        &state,
        &dto.identifier,
        &dto.password,
        fingerprint.0.as_deref(),
    )
    .await?;
    Ok(Json(tokens))
}

#[instrument(skip(state, dto))]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let tokens = SessionService::refresh(&state, &dto.refresh_token).await?;
    Ok(Json(tokens))
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    SessionService::logout(&state, user_id).await?;
    Ok(Json(MessageResponse::new("Logged out")))
}
