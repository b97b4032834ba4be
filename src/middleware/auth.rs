use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::modules::auth::service::SessionService;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Extractor that validates a bearer access token and yields the caller's id.
///
/// Refresh tokens are rejected here; they are only accepted by `/auth/refresh`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let user_id = SessionService::authenticate(state, token)?;

        Ok(AuthUser(user_id))
    }
}
