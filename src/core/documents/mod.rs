pub mod document_models;
pub mod document_source;
pub mod flattener;

pub use document_models::{Block, DocumentId, Paragraph, RichDocument, Table, TableCell, TableRow};
pub use document_source::{DocumentError, DocumentsClient};
pub use flattener::flatten;
