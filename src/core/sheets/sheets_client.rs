use async_trait::async_trait;
use thiserror::Error;

use super::sheet_models::{CellLinkMetadata, CellUpdate, ColumnRange, SheetRef};

/// Errors raised by the spreadsheet service.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Authorization failed: {0}")]
    Auth(String),
    #[error("Google Sheets API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Spreadsheet has no tabs")]
    NoSheets,
    #[error("No tab named '{0}' in the spreadsheet")]
    SheetNotFound(String),
}

/// Trait describing the spreadsheet operations the sync needs.
///
/// An implementation is bound to one spreadsheet; the pipeline only ever
/// talks about tabs, ranges and cells inside it.
#[async_trait]
pub trait SheetsClient: Send + Sync {
    /// Finds the tab called `name`, or the first tab when `name` is `None`.
    async fn find_sheet(&self, name: Option<&str>) -> Result<SheetRef, SheetError>;

    /// Reads the first cell of every row in `range`. Blank rows come back as "".
    async fn read_column(&self, range: &ColumnRange) -> Result<Vec<String>, SheetError>;

    /// Reads link metadata for every cell in `range`.
    async fn read_link_metadata(
        &self,
        range: &ColumnRange,
    ) -> Result<Vec<CellLinkMetadata>, SheetError>;

    /// Writes all updates in one round trip. Returns the number of cells updated.
    async fn batch_write(&self, updates: &[CellUpdate]) -> Result<usize, SheetError>;

    /// Writes a single cell.
    async fn write_cell(&self, update: &CellUpdate) -> Result<(), SheetError>;
}
