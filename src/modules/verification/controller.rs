use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use warden_models::auth::{
    MessageResponse, UpdateEmailRequest, UpdatePasswordRequest, UpdateUsernameRequest,
    VerificationTokenRequest,
};

use crate::middleware::auth::AuthUser;
use crate::modules::verification::service::VerificationService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

fn sent() -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Verification email sent")),
    )
}

#[instrument(skip(state, dto))]
pub async fn confirm_signup(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<VerificationTokenRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    VerificationService::confirm_signup(&state, &dto.token).await?;
    Ok(Json(MessageResponse::new("Account verified")))
}

#[instrument(skip(state, dto))]
pub async fn request_update_email(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateEmailRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    VerificationService::request_update_email(&state, user_id, &dto.new_email).await?;
    Ok(sent())
}

#[instrument(skip(state, dto))]
pub async fn confirm_update_email(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<VerificationTokenRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    VerificationService::confirm_update_email(&state, &dto.token).await?;
    Ok(Json(MessageResponse::new("Email address updated")))
}

#[instrument(skip(state, dto))]
pub async fn cancel_update_email(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<VerificationTokenRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    VerificationService::cancel_update_email(&state, &dto.token).await?;
    Ok(Json(MessageResponse::new("Email change cancelled")))
}

#[instrument(skip(state, dto))]
pub async fn request_update_username(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateUsernameRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    VerificationService::request_update_username(&state, user_id, &dto.new_username).await?;
    Ok(sent())
}

#[instrument(skip(state, dto))]
pub async fn confirm_update_username(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<VerificationTokenRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    VerificationService::confirm_update_username(&state, &dto.token).await?;
    Ok(Json(MessageResponse::new("Username updated")))
}

#[instrument(skip(state, dto))]
pub async fn request_update_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdatePasswordRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    VerificationService::request_update_password(
        &state,
        user_id,
        &dto.current_password,
        &dto.new_password,
    )
    .await?;
    Ok(sent())
}

#[instrument(skip(state, dto))]
pub async fn confirm_update_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<VerificationTokenRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    VerificationService::confirm_update_password(&state, &dto.token).await?;
    Ok(Json(MessageResponse::new("Password updated")))
}

#[instrument(skip(state))]
pub async fn request_delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    VerificationService::request_delete_account(&state, user_id).await?;
    Ok(sent())
}

#[instrument(skip(state, dto))]
pub async fn confirm_delete_account(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<VerificationTokenRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    VerificationService::confirm_delete_account(&state, &dto.token).await?;
    Ok(Json(MessageResponse::new("Account deleted")))
}

#[instrument(skip(state, dto))]
pub async fn cancel_delete_account(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<VerificationTokenRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    VerificationService::cancel_delete_account(&state, &dto.token).await?;
    Ok(Json(MessageResponse::new("Account deletion cancelled")))
}
