use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::{User, UserPatch, Validate};

const ME_PATH: &str = "/users/me";

/// GET /users/me
pub async fn current_user(client: &ApiClient) -> Result<User, ClientError> {
    client.get(ME_PATH).await
}

/// PUT /users/me
pub async fn update_profile(client: &ApiClient, patch: &UserPatch) -> Result<User, ClientError> {
    patch.validate()?;
    client.put(ME_PATH, patch).await
}
