//! Authenticated session and the durable key-value store behind it.
//!
//! The backend hands out an opaque token at login. The token is kept in an
//! explicit `Session` that callers pass to the HTTP client, and persisted in
//! a small JSON key-value file under the fixed key `Token` so the next run
//! can skip the login form.
//!
//! Key properties:
//! - The in-memory token is zeroed on drop
//! - Logout removes the persisted token before the session is dropped
//! - A missing store file reads as an empty store

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::config;

// ═══════════════════════════════════════════════════════════
// TokenStore: durable key-value file
// ═══════════════════════════════════════════════════════════

/// Durable string key-value store backed by a JSON object on disk.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.load()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    /// Remove a key. Returns whether it was present.
    pub fn remove(&self, key: &str) -> Result<bool, SessionError> {
        let mut entries = self.load()?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.save(&entries)?;
        }
        Ok(existed)
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) if data.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Write-then-rename so a crash never leaves a truncated store
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Session: one authenticated user
// ═══════════════════════════════════════════════════════════

/// Auth token, zeroed on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
struct AuthToken {
    value: String,
}

/// An authenticated session with the clinic backend.
pub struct Session {
    id: Uuid,
    token: AuthToken,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Wrap a token issued by `POST login/`.
    pub fn new(token: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            token: AuthToken { value: token },
            started_at: Utc::now(),
        }
    }

    /// Reload the session persisted by a previous login, if any.
    pub fn restore(store: &TokenStore) -> Result<Option<Self>, SessionError> {
        let token = store.get(config::TOKEN_KEY)?;
        Ok(token.filter(|t| !t.is_empty()).map(|t| {
            tracing::debug!(path = %store.path().display(), "Restored stored session");
            Self::new(t)
        }))
    }

    /// Persist the token under the fixed store key.
    pub fn persist(&self, store: &TokenStore) -> Result<(), SessionError> {
        store.set(config::TOKEN_KEY, &self.token.value)
    }

    /// Remove the persisted token and drop the session.
    pub fn logout(self, store: &TokenStore) -> Result<(), SessionError> {
        Self::clear(store)?;
        let minutes = (Utc::now() - self.started_at).num_minutes();
        tracing::info!(session_id = %self.id, minutes, "Logged out");
        Ok(())
    }

    /// Forget the persisted token without an owned session, e.g. when the
    /// backend rejects it. Returns whether a token was stored.
    pub fn clear(store: &TokenStore) -> Result<bool, SessionError> {
        store.remove(config::TOKEN_KEY)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Value of the `Authorization` header for backend requests.
    pub fn authorization(&self) -> String {
        format!("Token {}", self.token.value)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("token", &"<redacted>")
            .field("started_at", &self.started_at)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

/// Errors from session persistence.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
