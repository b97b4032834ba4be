use tracing::instrument;
use uuid::Uuid;

use warden_core::AuthError;
use warden_models::User;

use crate::state::AppState;

pub struct UserService;

impl UserService {
    #[instrument(skip(state))]
    pub async fn get_profile(state: &AppState, user_id: Uuid) -> Result<User, AuthError> {
        state
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::NoUserFound)
    }

    #[instrument(skip(state))]
    pub async fn get_image(state: &AppState, user_id: Uuid) -> Result<Option<Vec<u8>>, AuthError> {
        Ok(state.store.get_user_image(user_id).await?)
    }

    #[instrument(skip(state, image), fields(bytes = image.len()))]
    pub async fn set_image(state: &AppState, user_id: Uuid, image: &[u8]) -> Result<(), AuthError> {
        state.store.set_user_image(user_id, image).await?;
        Ok(())
    }
}
