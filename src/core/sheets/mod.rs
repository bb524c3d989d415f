pub mod a1;
pub mod sheet_models;
pub mod sheets_client;

pub use sheet_models::{CellAddress, CellLinkMetadata, CellUpdate, ColumnRange, SheetRef};
pub use sheets_client::{SheetError, SheetsClient};
