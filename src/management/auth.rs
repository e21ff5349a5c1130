use std::{io::ErrorKind, path::PathBuf};

use crate::{config, error::Result, types::AuthToken};

/// What a stored token allows at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Token is present and not yet expired.
    Valid(AuthToken),
    /// Token is present but its expiry lies in the past.
    Expired(AuthToken),
    /// Nothing stored.
    Missing,
}

impl Session {
    /// Whether the OAuth redirect flow has to run before any Spotify call.
    pub fn needs_authorization(&self) -> bool {
        !matches!(self, Session::Valid(_))
    }

    pub fn token(&self) -> Option<&AuthToken> {
        match self {
            Session::Valid(t) => Some(t),
            _ => None,
        }
    }
}

/// Persists the Spotify access token and its absolute expiry.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenStore { path: path.into() }
    }

    /// Store at the default location in the local data directory.
    pub fn from_env() -> Self {
        Self::new(config::token_path())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Reads the stored token; a missing file yields `None`.
    pub async fn load(&self) -> Result<Option<AuthToken>> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let token: AuthToken = serde_json::from_str(&content)?;
        Ok(Some(token))
    }

    pub async fn persist(&self, token: &AuthToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(token)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        match async_fs::remove_file(&self.path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Classifies the stored token against `now_ms`.
    pub async fn session(&self, now_ms: i64) -> Result<Session> {
        Ok(match self.load().await? {
            Some(token) if token.is_expired(now_ms) => Session::Expired(token),
            Some(token) => Session::Valid(token),
            None => Session::Missing,
        })
    }
}
