use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{
    cancel_delete_account, cancel_update_email, confirm_delete_account, confirm_signup,
    confirm_update_email, confirm_update_password, confirm_update_username,
    request_delete_account, request_update_email, request_update_password,
    request_update_username,
};

pub fn init_verification_router() -> Router<AppState> {
    Router::new()
        .route("/signup/confirm", post(confirm_signup))
        .route("/email", post(request_update_email))
        .route("/email/confirm", post(confirm_update_email))
        .route("/email/cancel", post(cancel_update_email))
        .route("/username", post(request_update_username))
        .route("/username/confirm", post(confirm_update_username))
        .route("/password", post(request_update_password))
        .route("/password/confirm", post(confirm_update_password))
        .route("/delete", post(request_delete_account))
        .route("/delete/confirm", post(confirm_delete_account))
        .route("/delete/cancel", post(cancel_delete_account))
}
