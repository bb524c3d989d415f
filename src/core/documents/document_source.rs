use async_trait::async_trait;
use thiserror::Error;

use super::document_models::{DocumentId, RichDocument};

/// Errors raised while fetching a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Authorization failed: {0}")]
    Auth(String),
    #[error("Google Docs API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Request failed: {0}")]
    Transport(String),
}

/// The one capability the pipeline needs from the document service.
#[async_trait]
pub trait DocumentsClient: Send + Sync {
    async fn fetch_document(&self, id: &DocumentId) -> Result<RichDocument, DocumentError>;
}
