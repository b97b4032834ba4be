use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use warden_models::auth::{OAuthLoginRequest, TokenPair};
use warden_models::{OAuthIdentity, OAuthProvider};

use crate::modules::oauth::service::OAuthService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

#[instrument(skip(state, dto))]
pub async fn oauth_login(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    ValidatedJson(dto): ValidatedJson<OAuthLoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let provider = provider
        .parse::<OAuthProvider>()
        .map_err(|_| AppError::not_found(anyhow!("Unknown provider: {}", provider)))?;

    let identity = OAuthIdentity {
        email: dto.email,
        display_name: dto.display_name,
        avatar_url: dto.avatar_url,
    };

    let tokens = OAuthService::handle_oauth(&state, provider, identity).await?;
    Ok(Json(tokens))
}
