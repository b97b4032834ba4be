//! Administrative commands run from the `warden` binary.

use uuid::Uuid;

use warden_core::AuthError;
use warden_models::Role;

use crate::modules::auth::service::SessionService;
use crate::state::AppState;

/// Creates a verified password account, bypassing email confirmation.
pub async fn create_user(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<Uuid, AuthError> {
    SessionService::signup(state, username, email, password, role).await
}
