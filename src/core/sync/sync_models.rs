// Models for one sync run: settings, per-row outcomes and the final tally.

use std::fmt;

/// Written when a row has a link we cannot make sense of.
pub const INVALID_LINK_MARKER: &str = "INVALID LINK";

/// Prefix for every per-row failure written into the output column.
pub const ERROR_MARKER_PREFIX: &str = "ERROR: ";

/// Message used when a document was fetched but produced no text.
pub const EMPTY_CONTENT_MESSAGE: &str = "Failed to extract content";

/// Rows above this are headers and never processed.
pub const HEADER_ROWS: u32 = 1;

/// Maximum number of characters a spreadsheet cell accepts.
pub const MAX_CELL_CHARS: usize = 50_000;

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Which tab and columns to sync, and how often to flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Tab title; `None` means the first tab.
    pub sheet_name: Option<String>,
    pub input_column: String,
    pub output_column: String,
    pub batch_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sheet_name: None,
            input_column: "R".to_string(),
            output_column: "S".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// A data row of the link column after link discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRow {
    /// 1-based sheet row.
    pub row: u32,
    pub link: Option<String>,
}

/// How one row ended up. Every processed row gets exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// No link, or only whitespace.
    Empty,
    /// Non-blank link that does not name a document.
    InvalidLink,
    /// The document service failed.
    FetchFailed(String),
    /// The document was fetched but flattened to nothing.
    EmptyContent,
    /// Extracted text.
    Content(String),
}

impl RowOutcome {
    /// The string that goes into the output cell.
    pub fn into_cell_value(self) -> String {
        match self {
            RowOutcome::Empty => String::new(),
            RowOutcome::InvalidLink => INVALID_LINK_MARKER.to_string(),
            RowOutcome::FetchFailed(message) => format!("{}{}", ERROR_MARKER_PREFIX, message),
            RowOutcome::EmptyContent => format!("{}{}", ERROR_MARKER_PREFIX, EMPTY_CONTENT_MESSAGE),
            RowOutcome::Content(text) => text,
        }
    }
}

/// Result of the write side of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub flushes: usize,
    pub cells_written: usize,
    /// Rows whose value was lost after the per-row fallback also failed.
    pub dropped_rows: Vec<u32>,
}

/// Final tally printed at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub rows_seen: usize,
    pub extracted: usize,
    pub empty: usize,
    pub invalid_links: usize,
    pub fetch_errors: usize,
    pub empty_documents: usize,
    pub writes: WriteReport,
}

impl SyncSummary {
    pub fn record(&mut self, outcome: &RowOutcome) {
        self.rows_seen += 1;
        match outcome {
            RowOutcome::Empty => self.empty += 1,
            RowOutcome::InvalidLink => self.invalid_links += 1,
            RowOutcome::FetchFailed(_) => self.fetch_errors += 1,
            RowOutcome::EmptyContent => self.empty_documents += 1,
            RowOutcome::Content(_) => self.extracted += 1,
        }
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} rows: {} extracted, {} without link, {} invalid links, \
             {} fetch errors, {} empty documents; wrote {} cells in {} flushes, {} rows dropped",
            self.rows_seen,
            self.extracted,
            self.empty,
            self.invalid_links,
            self.fetch_errors,
            self.empty_documents,
            self.writes.cells_written,
            self.writes.flushes,
            self.writes.dropped_rows.len()
        )
    }
}

/// Cuts `text` to at most `max_chars` characters, never splitting a character.
/// Returns whether anything was cut.
pub fn truncate_chars(text: &mut String, max_chars: usize) -> bool {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            text.truncate(byte_index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_map_to_markers() {
        assert_eq!(RowOutcome::Empty.into_cell_value(), "");
        assert_eq!(RowOutcome::InvalidLink.into_cell_value(), "INVALID LINK");
        assert_eq!(
            RowOutcome::FetchFailed("boom".into()).into_cell_value(),
            "ERROR: boom"
        );
        assert_eq!(
            RowOutcome::EmptyContent.into_cell_value(),
            "ERROR: Failed to extract content"
        );
        assert_eq!(RowOutcome::Content("text".into()).into_cell_value(), "text");
    }

    #[test]
    fn summary_counts_each_outcome_once() {
        let mut summary = SyncSummary::default();
        for outcome in [
            RowOutcome::Empty,
            RowOutcome::InvalidLink,
            RowOutcome::FetchFailed("x".into()),
            RowOutcome::EmptyContent,
            RowOutcome::Content("a".into()),
            RowOutcome::Content("b".into()),
        ] {
            summary.record(&outcome);
        }
        assert_eq!(summary.rows_seen, 6);
        assert_eq!(summary.extracted, 2);
        assert_eq!(summary.empty, 1);
        assert_eq!(summary.invalid_links, 1);
        assert_eq!(summary.fetch_errors, 1);
        assert_eq!(summary.empty_documents, 1);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut text = "héllo".to_string();
        assert!(truncate_chars(&mut text, 2));
        assert_eq!(text, "hé");

        let mut short = "abc".to_string();
        assert!(!truncate_chars(&mut short, 3));
        assert_eq!(short, "abc");
    }
}
