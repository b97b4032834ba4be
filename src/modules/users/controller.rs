use anyhow::anyhow;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::instrument;

use warden_models::User;

use crate::middleware::auth::AuthUser;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, AppError> {
    let user = UserService::get_profile(&state, user_id).await?;
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn get_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let image = UserService::get_image(&state, user_id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("No image set")))?;

    Ok(([(header::CONTENT_TYPE, content_type(&image))], image))
}

#[instrument(skip(state, body))]
pub async fn set_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    if body.is_empty() {
        return Err(AppError::bad_request(anyhow!("Image body is empty")));
    }

    UserService::set_image(&state, user_id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Sniffs the common web image formats; anything else is served as bytes.
fn content_type(image: &[u8]) -> &'static str {
    match image {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_sniffing() {
        assert_eq!(content_type(b"\x89PNG\r\n\x1a\n"), "image/png");
        assert_eq!(content_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(content_type(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(content_type(b"hello"), "application/octet-stream");
    }
}
