//! Session store — sole owner of the bearer credential.
//!
//! The credential lives in memory for fast reads by every request and is
//! mirrored into a [`SessionStorage`] so a restart restores the session
//! without logging in again.
//!
//! Every start or end of a session bumps the *epoch*. Collections remember the
//! epoch their cache was filled under, and in-flight calls capture it at
//! dispatch, so both can tell when the session changed underneath them.

pub mod storage;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::ClientError;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, TOKEN_KEY, USER_KEY};

/// Opaque bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Cached identity blob stored alongside the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Default)]
struct SessionState {
    credential: Option<Credential>,
    user: Option<SessionUser>,
    epoch: u64,
}

pub struct SessionStore {
    state: RwLock<SessionState>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            storage,
        }
    }

    /// Loads a persisted credential, if any. Returns whether a session was restored.
    ///
    /// A corrupt user blob is dropped; the token alone is enough to authenticate.
    pub async fn restore(&self) -> Result<bool, ClientError> {
        let Some(token) = self.storage.get(TOKEN_KEY).await? else {
            return Ok(false);
        };

        let user = match self.storage.get(USER_KEY).await? {
            Some(blob) => match serde_json::from_str::<SessionUser>(&blob) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Ignoring unreadable cached user identity: {e}");
                    None
                }
            },
            None => None,
        };

        let mut state = self.state.write();
        state.credential = Some(Credential::new(token));
        state.user = user;
        state.epoch += 1;
        info!("Restored persisted session (epoch {})", state.epoch);
        Ok(true)
    }

    /// Starts a new session and persists it.
    ///
    /// The in-memory session is live even if persisting fails; the error is
    /// still returned so the caller knows a restart will not restore it.
    pub async fn start(&self, token: String, user: Option<SessionUser>) -> Result<(), ClientError> {
        let user_blob = user.as_ref().map(serde_json::to_string).transpose()?;
        {
            let mut state = self.state.write();
            state.credential = Some(Credential::new(token.clone()));
            state.user = user;
            state.epoch += 1;
            info!("Session started (epoch {})", state.epoch);
        }

        self.storage.set(TOKEN_KEY, &token).await?;
        match user_blob {
            Some(blob) => self.storage.set(USER_KEY, &blob).await,
            None => self.storage.remove(USER_KEY).await,
        }
    }

    /// Ends the session. Always succeeds: storage failures are logged, not returned.
    pub async fn end(&self) {
        let had_credential = {
            let mut state = self.state.write();
            let had = state.credential.take().is_some();
            state.user = None;
            state.epoch += 1;
            had
        };

        if had_credential {
            info!("Session ended");
        }

        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key).await {
                warn!("Failed to clear persisted session key '{key}': {e}");
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().credential.is_some()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.state.read().credential.clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.state.read().user.clone()
    }

    pub fn epoch(&self) -> u64 {
        self.state.read().epoch
    }
}
