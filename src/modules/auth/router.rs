use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{login, logout, refresh, signup};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}
