use axum::{Router, extract::DefaultBodyLimit, routing::get};

use crate::state::AppState;

use super::controller::{MAX_IMAGE_BYTES, get_image, get_profile, set_image};

pub fn init_users_router() -> Router<AppState> {
    Router::new().route("/me", get(get_profile)).route(
        "/me/image",
        get(get_image)
            .put(set_image)
            .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
    )
}
