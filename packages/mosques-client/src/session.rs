//! Process-wide credential.
//!
//! One writer (login, logout, or a 401), many readers. Every request reads
//! the token fresh, so a logout is visible to the very next call.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use mosques_core::workflow::{Actor, Role};
use mosques_core::UserId;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};

/// What the API hands back on login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub role: Role,
    pub user_id: Option<UserId>,
}

impl Credential {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

// Tokens never end up in logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("role", &self.role)
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { role: Role, user_id: Option<UserId> },
    LoggedOut,
    /// The API rejected the credential; the user must sign in again
    Expired,
}

/// Where a credential survives between runs.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<Credential>>;
    async fn save(&self, credential: &Credential) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Keeps the credential for the life of the process only.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credential: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<Credential>> {
        Ok(self.credential.read().await.clone())
    }

    async fn save(&self, credential: &Credential) -> Result<()> {
        *self.credential.write().await = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.credential.write().await = None;
        Ok(())
    }
}

/// JSON file on disk, used by the admin CLI between invocations.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Credential>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ClientError::Config(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match serde_json::from_str(&raw) {
            Ok(credential) => Ok(Some(credential)),
            Err(e) => {
                // A corrupt file means signed out, not a hard failure.
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable credential file");
                Ok(None)
            }
        }
    }

    async fn save(&self, credential: &Credential) -> Result<()> {
        let raw = serde_json::to_string_pretty(credential)
            .map_err(|e| ClientError::Config(format!("Failed to encode credential: {}", e)))?;
        tokio::fs::write(&self.path, raw).await.map_err(|e| {
            ClientError::Config(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Config(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// Shared session handle. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    credential: Arc<RwLock<Option<Credential>>>,
    store: Arc<dyn CredentialStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            credential: Arc::new(RwLock::new(None)),
            store,
            events,
        }
    }

    /// Session backed by an in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCredentialStore::new()))
    }

    /// Load a previously saved credential, if any.
    pub async fn restore(&self) -> Result<Option<Credential>> {
        let loaded = self.store.load().await?;
        *self.credential.write().await = loaded.clone();
        if let Some(credential) = &loaded {
            debug!(role = %credential.role, "Session restored");
        }
        Ok(loaded)
    }

    pub async fn login(&self, credential: Credential) -> Result<()> {
        self.store.save(&credential).await?;
        let event = SessionEvent::LoggedIn {
            role: credential.role,
            user_id: credential.user_id,
        };
        *self.credential.write().await = Some(credential);
        info!("Logged in");
        let _ = self.events.send(event);
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        *self.credential.write().await = None;
        self.store.clear().await?;
        info!("Logged out");
        let _ = self.events.send(SessionEvent::LoggedOut);
        Ok(())
    }

    pub async fn current(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.credential
            .read()
            .await
            .as_ref()
            .map(|c| c.access_token.clone())
    }

    /// The caller as the workflow engine sees them.
    pub async fn actor(&self) -> Actor {
        self.credential
            .read()
            .await
            .as_ref()
            .map(Credential::actor)
            .unwrap_or_else(Actor::anonymous)
    }

    /// Drop the credential after the API rejected `rejected_token`.
    ///
    /// Only clears if that token is still the current one, so a burst of
    /// 401s from one credential clears it once, and a stale 401 never logs
    /// out a fresh login. Returns true if this call did the clearing.
    pub async fn invalidate(&self, rejected_token: &str) -> bool {
        {
            let mut credential = self.credential.write().await;
            match credential.as_ref() {
                Some(c) if c.access_token == rejected_token => *credential = None,
                _ => return false,
            }
        }

        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear stored credential");
        }
        warn!("Session expired; credential cleared");
        let _ = self.events.send(SessionEvent::Expired);
        true
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
