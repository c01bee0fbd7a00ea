//! API client — every backend call goes through here.
//!
//! Every request goes through [`ApiClient::request`]. It attaches the session
//! credential, maps failures into [`ClientError`], and ends the session when
//! the backend answers 401.
//!
//! No retry: failures are surfaced to the caller, who decides whether to try again.

use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::ClientError;
use crate::session::SessionStore;

/// Whether a call needs a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Rejected locally with `NotAuthenticated` when no credential is held.
    Authenticated,
    /// Sent regardless; the credential is attached if there is one.
    Public,
}

enum Payload<'a> {
    Empty,
    Json(Value),
    Form(&'a [(&'a str, &'a str)]),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Cheap to clone: the HTTP pool and the session store are shared.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    api_url: String,
    root_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<SessionStore>) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            api_url: config.api_url(),
            root_url: config.root_url(),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Makes an authenticated call and decodes the JSON response into `T`.
    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = match body {
            Some(body) => Payload::Json(serde_json::to_value(body)?),
            None => Payload::Empty,
        };
        let text = self
            .execute(method, &self.api_path(path), payload, Access::Authenticated)
            .await?;
        decode(&text)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request::<(), T>(Method::GET, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// DELETE ignores the response body; a 2xx status is confirmation enough.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(
            Method::DELETE,
            &self.api_path(path),
            Payload::Empty,
            Access::Authenticated,
        )
        .await?;
        Ok(())
    }

    /// Unauthenticated JSON POST, for registration.
    pub async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = Payload::Json(serde_json::to_value(body)?);
        let text = self
            .execute(Method::POST, &self.api_path(path), payload, Access::Public)
            .await?;
        decode(&text)
    }

    /// Unauthenticated form-encoded POST, for the login endpoint.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let text = self
            .execute(
                Method::POST,
                &self.api_path(path),
                Payload::Form(fields),
                Access::Public,
            )
            .await?;
        decode(&text)
    }

    /// GET /health — liveness probe, served outside the API prefix.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = format!("{}/health", self.root_url);
        let text = self
            .execute(Method::GET, &url, Payload::Empty, Access::Public)
            .await?;
        decode(&text)
    }

    fn api_path(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        payload: Payload<'_>,
        access: Access,
    ) -> Result<String, ClientError> {
        let credential = self.session.credential();
        if access == Access::Authenticated && credential.is_none() {
            debug!("Rejecting {method} {url}: no active session");
            return Err(ClientError::NotAuthenticated);
        }

        let mut builder = self.http.request(method.clone(), url);
        if let Some(credential) = &credential {
            builder = builder.bearer_auth(credential.expose());
        }
        builder = match payload {
            Payload::Empty => builder,
            Payload::Json(value) => builder.json(&value),
            Payload::Form(fields) => builder.form(fields),
        };

        debug!("{method} {url}");
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            let message = error_message(&body);
            if credential.is_some() {
                warn!("{method} {url} returned 401; ending session");
                self.session.end().await;
            }
            return Err(ClientError::Auth(message));
        }

        if !status.is_success() {
            let message = error_message(&body);
            debug!("{method} {url} failed with {status}: {message}");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

/// Decodes a response body against the expected schema.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body)
        .map_err(|e| ClientError::Decode(format!("unexpected response payload: {e}")))
}

/// Pulls the human-readable message out of an error response.
///
/// Understands `{"detail": "..."}`, `{"detail": [{"msg": "..."}]}`,
/// `{"message": "..."}` and `{"error": {"message": "..."}}`; anything else
/// yields the raw body. An empty body yields an empty message so callers fall
/// back to their own wording.
fn error_message(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(json) = serde_json::from_str::<Value>(trimmed) {
        if let Some(detail) = json.get("detail") {
            if let Some(text) = detail.as_str() {
                return text.to_string();
            }
            if let Some(items) = detail.as_array() {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !msgs.is_empty() {
                    return msgs.join("; ");
                }
            }
        }
        if let Some(text) = json.get("message").and_then(Value::as_str) {
            return text.to_string();
        }
        if let Some(error) = json.get("error") {
            if let Some(text) = error.get("message").and_then(Value::as_str) {
                return text.to_string();
            }
            if let Some(text) = error.as_str() {
                return text.to_string();
            }
        }
    }

    trimmed.to_string()
}
