// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side token storage.
//!
//! Holds the access/refresh token pair and the remember-me flag. Tokens are
//! stored as given: no expiry tracking, no encryption, no rotation.

use crate::models::TokenPair;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Token storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("token storage lock poisoned")]
    Poisoned,
}

/// Durable session storage shared by the resolver and the session manager.
pub trait TokenStore: Send + Sync {
    /// Store both tokens, replacing any previous pair.
    fn set(&self, tokens: &TokenPair) -> Result<(), StoreError>;

    /// The stored pair, or `None` if never set or cleared.
    fn get(&self) -> Result<Option<TokenPair>, StoreError>;

    fn set_remember_me(&self, remember: bool) -> Result<(), StoreError>;

    fn remember_me(&self) -> Result<bool, StoreError>;

    /// Remove the tokens and the remember-me flag.
    fn clear(&self) -> Result<(), StoreError>;

    fn access_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.get()?.map(|tokens| tokens.access_token))
    }
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn set(&self, tokens: &TokenPair) -> Result<(), StoreError> {
        (**self).set(tokens)
    }

    fn get(&self) -> Result<Option<TokenPair>, StoreError> {
        (**self).get()
    }

    fn set_remember_me(&self, remember: bool) -> Result<(), StoreError> {
        (**self).set_remember_me(remember)
    }

    fn remember_me(&self) -> Result<bool, StoreError> {
        (**self).remember_me()
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// Persisted record. Key names match what browser clients keep in local storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub remember_me: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredSession {
    fn tokens(&self) -> Option<TokenPair> {
        Some(TokenPair {
            access_token: self.access_token.clone()?,
            refresh_token: self.refresh_token.clone()?,
        })
    }

    fn with_tokens(mut self, tokens: &TokenPair) -> Self {
        self.access_token = Some(tokens.access_token.clone());
        self.refresh_token = Some(tokens.refresh_token.clone());
        self.updated_at = Some(Utc::now());
        self
    }
}

// ─── In-memory store ─────────────────────────────────────────

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: Mutex<StoredSession>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with tokens already present.
    pub fn with_tokens(tokens: &TokenPair) -> Self {
        Self {
            session: Mutex::new(StoredSession::default().with_tokens(tokens)),
        }
    }

    fn update(&self, f: impl FnOnce(StoredSession) -> StoredSession) -> Result<(), StoreError> {
        let mut session = self.session.lock().map_err(|_| StoreError::Poisoned)?;
        *session = f(std::mem::take(&mut *session));
        Ok(())
    }

    fn read(&self) -> Result<StoredSession, StoreError> {
        Ok(self.session.lock().map_err(|_| StoreError::Poisoned)?.clone())
    }
}

impl TokenStore for MemoryTokenStore {
    fn set(&self, tokens: &TokenPair) -> Result<(), StoreError> {
        self.update(|s| s.with_tokens(tokens))
    }

    fn get(&self) -> Result<Option<TokenPair>, StoreError> {
        Ok(self.read()?.tokens())
    }

    fn set_remember_me(&self, remember: bool) -> Result<(), StoreError> {
        self.update(|s| StoredSession {
            remember_me: remember,
            ..s
        })
    }

    fn remember_me(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.remember_me)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.update(|_| StoredSession::default())
    }
}

// ─── File-backed store ───────────────────────────────────────

/// JSON file on disk; survives restarts. An absent or empty file is "no session".
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoredSession, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoredSession::default()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(StoredSession::default());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Write via a sibling temp file and rename, so readers never see a torn file.
    fn save(&self, session: &StoredSession) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(session)?;
        let tmp_path = self.path.with_extension("tmp");

        {
            let mut file = open_private(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), "Token storage written");
        Ok(())
    }

    fn update(&self, f: impl FnOnce(StoredSession) -> StoredSession) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let session = f(self.load()?);
        self.save(&session)
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::File::create(path)
}

impl TokenStore for FileTokenStore {
    fn set(&self, tokens: &TokenPair) -> Result<(), StoreError> {
        self.update(|s| s.with_tokens(tokens))
    }

    fn get(&self) -> Result<Option<TokenPair>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.load()?.tokens())
    }

    fn set_remember_me(&self, remember: bool) -> Result<(), StoreError> {
        self.update(|s| StoredSession {
            remember_me: remember,
            ..s
        })
    }

    fn remember_me(&self) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.load()?.remember_me)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
