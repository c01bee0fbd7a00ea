use tracing::info;

use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::user::{RegisterResponse, TokenResponse};
use crate::models::{Credentials, Registration, Validate};

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";

/// POST /auth/login
///
/// Credentials go out form-encoded. A 401 surfaces as `ClientError::Auth`
/// carrying the backend's reason.
pub async fn login(client: &ApiClient, credentials: &Credentials) -> Result<TokenResponse, ClientError> {
    credentials.validate()?;
    let fields = [
        ("username", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
    ];
    let token: TokenResponse = client.post_form(LOGIN_PATH, &fields).await?;
    if token.access_token.trim().is_empty() {
        return Err(ClientError::Decode(
            "login response carried an empty access_token".to_string(),
        ));
    }
    info!("Logged in as {}", credentials.username);
    Ok(token)
}

/// POST /auth/register
pub async fn register(
    client: &ApiClient,
    registration: &Registration,
) -> Result<RegisterResponse, ClientError> {
    registration.validate()?;
    let response: RegisterResponse = client.post_public(REGISTER_PATH, registration).await?;
    info!("Registered account {}", response.user.email);
    Ok(response)
}
