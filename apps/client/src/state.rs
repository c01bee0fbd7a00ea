use std::sync::Arc;

use tracing::{info, warn};

use crate::api_client::{ApiClient, HealthStatus};
use crate::collection::{Collection, ProfileCollections};
use crate::config::Config;
use crate::errors::ClientError;
use crate::models::{
    Credentials, Document, EmployerProfile, RecordId, Registration, User, UserPatch,
};
use crate::services::{auth, employers, users};
use crate::session::{FileStorage, SessionStorage, SessionStore, SessionUser};

/// Application context handed to whatever drives the client.
///
/// Owns the session store, the API client and every collection. Created once
/// at start-up with [`AppContext::init`]; [`AppContext::logout`] tears the
/// session and all caches down again.
pub struct AppContext {
    pub config: Config,
    session: Arc<SessionStore>,
    client: ApiClient,
    pub documents: Collection<Document>,
    pub profile: ProfileCollections,
}

impl AppContext {
    /// Builds the context and restores a persisted session if there is one.
    pub async fn init(config: Config, storage: Arc<dyn SessionStorage>) -> Result<Self, ClientError> {
        let session = Arc::new(SessionStore::new(storage));
        session.restore().await?;

        let client = ApiClient::new(&config, session.clone())?;
        info!("Client initialized against {}", config.api_url());

        Ok(Self {
            documents: Collection::new(client.clone()),
            profile: ProfileCollections::new(client.clone()),
            config,
            session,
            client,
        })
    }

    /// [`AppContext::init`] with the JSON session file named in the config.
    pub async fn from_config(config: Config) -> Result<Self, ClientError> {
        let storage = Arc::new(FileStorage::new(&config.session_file));
        Self::init(config, storage).await
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Session lifecycle
    // ────────────────────────────────────────────────────────────────────────

    /// Logs in and starts a new session. Caches from any previous session are dropped.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ClientError> {
        let token = auth::login(&self.client, credentials).await?;
        self.clear_caches();
        let user = SessionUser {
            username: credentials.username.clone(),
            email: None,
        };
        self.session.start(token.access_token, Some(user)).await
    }

    /// Registers an account. When the backend hands back a token the new
    /// account is logged in straight away.
    pub async fn register(&self, registration: &Registration) -> Result<User, ClientError> {
        let response = auth::register(&self.client, registration).await?;
        if let Some(token) = response.access_token {
            self.clear_caches();
            let user = SessionUser {
                username: response
                    .user
                    .username
                    .clone()
                    .unwrap_or_else(|| response.user.email.clone()),
                email: Some(response.user.email.clone()),
            };
            self.session.start(token, Some(user)).await?;
        }
        Ok(response.user)
    }

    /// Ends the session and clears every cache. Always succeeds.
    ///
    /// In-flight calls are not cancelled; their results are discarded when
    /// they resolve.
    pub async fn logout(&self) {
        self.session.end().await;
        self.clear_caches();
    }

    /// Confirms a restored credential is still accepted by the backend.
    ///
    /// A 401 ends the session (the API client does that); other failures leave
    /// it in place so a flaky network does not log the user out.
    pub async fn verify(&self) -> Result<User, ClientError> {
        match users::current_user(&self.client).await {
            Ok(user) => Ok(user),
            Err(e) => {
                if e.requires_login() {
                    self.clear_caches();
                } else {
                    warn!("Session check failed: {e}");
                }
                Err(e)
            }
        }
    }

    fn clear_caches(&self) {
        self.documents.clear();
        self.profile.clear();
    }

    // ────────────────────────────────────────────────────────────────────────
    // Uncached endpoints
    // ────────────────────────────────────────────────────────────────────────

    pub async fn current_user(&self) -> Result<User, ClientError> {
        users::current_user(&self.client).await
    }

    pub async fn update_profile(&self, patch: &UserPatch) -> Result<User, ClientError> {
        users::update_profile(&self.client, patch).await
    }

    pub async fn scrape_employer(&self, url: &str) -> Result<EmployerProfile, ClientError> {
        employers::scrape_employer(&self.client, url).await
    }

    pub async fn list_employers(&self) -> Result<Vec<EmployerProfile>, ClientError> {
        employers::list_employers(&self.client).await
    }

    pub async fn get_employer(&self, id: &RecordId) -> Result<EmployerProfile, ClientError> {
        employers::get_employer(&self.client, id).await
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.client.health().await
    }
}
