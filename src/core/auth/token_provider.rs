// The pipeline never sees credentials. It only needs something that can hand
// out a bearer token for the next request, refreshing or failing as needed.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Client credentials file not found: {0}")]
    MissingCredentials(String),
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("Token cache error: {0}")]
    TokenCache(String),
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
    #[error("Authorization flow failed: {0}")]
    Consent(String),
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a bearer token valid for at least the next request.
    async fn access_token(&self) -> Result<String, AuthError>;
}
