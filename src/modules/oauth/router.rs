use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::oauth_login;

pub fn init_oauth_router() -> Router<AppState> {
    Router::new().route("/{provider}", post(oauth_login))
}
