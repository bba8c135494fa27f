use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::security::audit_log::AuditLogger;
use crate::security::storage::{CredentialStorage, MemoryStorage, StorageError};

pub const TOKEN_KEY: &str = "token";
pub const USER_NAME_KEY: &str = "userName";
pub const REAL_NAME_KEY: &str = "realName";
pub const PHONE_NUMBER_KEY: &str = "phoneNumber";

const PERSISTED_KEYS: [&str; 4] = [TOKEN_KEY, USER_NAME_KEY, REAL_NAME_KEY, PHONE_NUMBER_KEY];

/// Snapshot of the signed-in identity. Empty strings mean "unset".
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub token: String,
    pub user_name: String,
    pub real_name: String,
    pub phone_number: String,
}

impl Credential {
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = if self.token.is_empty() { "" } else { "[REDACTED]" };
        f.debug_struct("Credential")
            .field("token", &token)
            .field("user_name", &self.user_name)
            .field("real_name", &self.real_name)
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

/// Shared credential store.
///
/// Clones share state, so the HTTP pipeline and the caller always observe the
/// same token. Every mutation is written through to the backing storage.
#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<Credential>>,
    updated_at: Arc<RwLock<Option<DateTime<Utc>>>>,
    storage: Arc<dyn CredentialStorage>,
    audit: AuditLogger,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Rehydrate from storage; missing keys read as empty.
    pub fn restore(storage: Arc<dyn CredentialStorage>) -> Result<Self, StorageError> {
        let read = |key: &str| -> Result<String, StorageError> {
            Ok(storage.get(key)?.unwrap_or_default())
        };
        let credential = Credential {
            token: read(TOKEN_KEY)?,
            user_name: read(USER_NAME_KEY)?,
            real_name: read(REAL_NAME_KEY)?,
            phone_number: read(PHONE_NUMBER_KEY)?,
        };
        debug!(authenticated = credential.is_authenticated(), "session restored from storage");

        Ok(Self {
            state: Arc::new(RwLock::new(credential)),
            updated_at: Arc::new(RwLock::new(None)),
            storage,
            audit: AuditLogger::new(),
        })
    }

    /// Empty session over `MemoryStorage`.
    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(RwLock::new(Credential::default())),
            updated_at: Arc::new(RwLock::new(None)),
            storage: Arc::new(MemoryStorage::new()),
            audit: AuditLogger::new(),
        }
    }

    pub async fn get(&self) -> Credential {
        self.state.read().await.clone()
    }

    /// Current bearer token, possibly empty.
    pub async fn token(&self) -> String {
        self.state.read().await.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    /// Install a new session. Token, display name and phone change together.
    pub async fn set_session(
        &self,
        token: impl Into<String>,
        real_name: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Result<(), StorageError> {
        let (token, real_name, phone_number) = (token.into(), real_name.into(), phone_number.into());

        // Memory only changes once storage has accepted all three fields.
        let mut state = self.state.write().await;
        self.storage.set_many(&[
            (TOKEN_KEY, token.as_str()),
            (REAL_NAME_KEY, real_name.as_str()),
            (PHONE_NUMBER_KEY, phone_number.as_str()),
        ])?;
        state.token = token;
        state.real_name = real_name;
        state.phone_number = phone_number;

        self.audit.session_started(&state.real_name);
        drop(state);
        self.touch().await;
        Ok(())
    }

    /// Record the login name used to sign in.
    pub async fn set_user_name(&self, user_name: impl Into<String>) -> Result<(), StorageError> {
        let user_name = user_name.into();
        let mut state = self.state.write().await;
        self.storage.set(USER_NAME_KEY, &user_name)?;
        state.user_name = user_name;
        drop(state);
        self.touch().await;
        Ok(())
    }

    /// Forget everything, in memory and in storage. Safe to call repeatedly.
    pub async fn clear(&self) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let was_authenticated = state.is_authenticated();
        *state = Credential::default();

        let mut first_err = None;
        for key in PERSISTED_KEYS {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "failed to remove persisted session key");
                first_err.get_or_insert(e);
            }
        }
        drop(state);

        if was_authenticated {
            self.audit.session_cleared();
        }
        self.touch().await;

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Time of the last mutation made through this session.
    pub async fn updated_at(&self) -> Option<DateTime<Utc>> {
        *self.updated_at.read().await
    }

    /// Seconds since the last mutation, if one happened in this process.
    pub async fn age_secs(&self) -> Option<i64> {
        self.updated_at()
            .await
            .map(|at| (Utc::now() - at).num_seconds())
    }

    async fn touch(&self) {
        *self.updated_at.write().await = Some(Utc::now());
    }
}
