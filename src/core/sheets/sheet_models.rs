// Spreadsheet-side models: which tab we work on, where a cell lives,
// and what link metadata the sheet service reports for a cell.

use std::fmt;

use super::a1::quote_sheet_name;

/// A tab inside the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    pub sheet_id: i64,
    pub title: String,
}

/// One cell in A1 notation, e.g. `'Sheet 1'!S5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAddress {
    pub sheet: String,
    pub column: String,
    /// 1-based sheet row.
    pub row: u32,
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!{}{}",
            quote_sheet_name(&self.sheet),
            self.column,
            self.row
        )
    }
}

/// An open-ended single-column range, e.g. `'Sheet 1'!R2:R`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRange {
    pub sheet: String,
    pub column: String,
    pub first_row: u32,
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!{}{}:{}",
            quote_sheet_name(&self.sheet),
            self.column,
            self.first_row,
            self.column
        )
    }
}

/// A pending value for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub address: CellAddress,
    pub value: String,
}

/// Every place the sheet service may have stashed a link for one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellLinkMetadata {
    /// Link applied to the whole cell.
    pub hyperlink: Option<String>,
    /// Links applied to parts of the cell text, in order.
    pub text_run_links: Vec<String>,
    /// The user-entered formula, if the cell holds one.
    pub formula: Option<String>,
    /// What the cell displays.
    pub formatted_value: Option<String>,
}
