use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::core::auth::AuthError;

/// Tokens this close to expiry are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// What we keep on disk between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl StoredToken {
    /// Usable for at least another minute. Tokens without an expiry are never fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .map(|expiry| expiry > now + Duration::seconds(EXPIRY_MARGIN_SECS))
            .unwrap_or(false)
    }

    pub fn covers(&self, scopes: &[&str]) -> bool {
        scopes
            .iter()
            .all(|scope| self.scopes.iter().any(|s| s == scope))
    }
}

/// JSON file holding the cached user token.
pub struct TokenCacheFile {
    path: PathBuf,
}

impl TokenCacheFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when there is no cache yet.
    pub async fn load(&self) -> Result<Option<StoredToken>, AuthError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(&self.path)
            .await
            .map_err(|e| AuthError::TokenCache(e.to_string()))?;
        let token = serde_json::from_str(&text).map_err(|e| {
            AuthError::TokenCache(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(Some(token))
    }

    pub async fn save(&self, token: &StoredToken) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AuthError::TokenCache(e.to_string()))?;
            }
        }

        let text = serde_json::to_string_pretty(token)
            .map_err(|e| AuthError::TokenCache(e.to_string()))?;
        fs::write(&self.path, text)
            .await
            .map_err(|e| AuthError::TokenCache(e.to_string()))
    }
}
