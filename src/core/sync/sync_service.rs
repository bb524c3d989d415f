// The row pipeline: sheet -> links -> documents -> text -> sheet.
//
// Rows are handled strictly one after another, in sheet order. A row can
// only fail on its own; nothing a single row does stops the run. The only
// errors that escape `run` are the setup ones (no tab, unreadable column).

use thiserror::Error;

use super::batch_writer::BatchWriter;
use super::sync_models::{
    truncate_chars, LinkRow, RowOutcome, SyncConfig, SyncSummary, HEADER_ROWS, MAX_CELL_CHARS,
};
use crate::core::documents::{flatten, DocumentsClient};
use crate::core::links::{discover_link, resolve};
use crate::core::sheets::{ColumnRange, SheetError, SheetRef, SheetsClient};

/// Fatal errors. Per-row problems never show up here.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to resolve target sheet: {0}")]
    SheetLookup(#[source] SheetError),
    #[error("Failed to read links from {range}: {source}")]
    ReadLinks { range: String, source: SheetError },
}

/// How much of a link to show in log lines.
const LINK_PREVIEW_CHARS: usize = 80;

pub struct SyncService<S: SheetsClient, D: DocumentsClient> {
    sheets: S,
    documents: D,
    config: SyncConfig,
}

impl<S: SheetsClient, D: DocumentsClient> SyncService<S, D> {
    pub fn new(sheets: S, documents: D, config: SyncConfig) -> Self {
        Self {
            sheets,
            documents,
            config,
        }
    }

    /// Runs one full pass over the link column.
    pub async fn run(&self) -> Result<SyncSummary, SyncError> {
        let sheet = self
            .sheets
            .find_sheet(self.config.sheet_name.as_deref())
            .await
            .map_err(SyncError::SheetLookup)?;
        tracing::info!("Working with sheet: {} (id {})", sheet.title, sheet.sheet_id);

        let rows = self.read_link_rows(&sheet).await?;
        tracing::info!(
            "Found {} rows with data in column {}",
            rows.len(),
            self.config.input_column
        );

        let mut writer = BatchWriter::new(
            &self.sheets,
            &sheet.title,
            &self.config.output_column,
            self.config.batch_size,
        );
        let mut summary = SyncSummary::default();

        for link_row in &rows {
            let outcome = self.process_row(link_row).await;
            summary.record(&outcome);
            writer.push(link_row.row, outcome.into_cell_value()).await;
        }

        summary.writes = writer.finish().await;
        Ok(summary)
    }

    /// Reads the link column below the header and runs link discovery on each row.
    async fn read_link_rows(&self, sheet: &SheetRef) -> Result<Vec<LinkRow>, SyncError> {
        let range = ColumnRange {
            sheet: sheet.title.clone(),
            column: self.config.input_column.clone(),
            first_row: HEADER_ROWS + 1,
        };
        tracing::info!("Reading links from {}", range);

        let values = self
            .sheets
            .read_column(&range)
            .await
            .map_err(|source| SyncError::ReadLinks {
                range: range.to_string(),
                source,
            })?;

        let metadata = match self.sheets.read_link_metadata(&range).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(
                    "Could not read hyperlink metadata ({}), falling back to cell values",
                    e
                );
                Vec::new()
            }
        };

        // Metadata may report blank trailing rows; only go as far as the last real link.
        let metadata_rows = metadata
            .iter()
            .rposition(|cell| discover_link(Some(cell), None).is_some())
            .map_or(0, |i| i + 1);
        let row_count = values.len().max(metadata_rows);

        Ok((0..row_count)
            .map(|i| LinkRow {
                row: range.first_row + i as u32,
                link: discover_link(metadata.get(i), values.get(i).map(String::as_str)),
            })
            .collect())
    }

    /// Decides the output for one row. Never fails.
    async fn process_row(&self, link_row: &LinkRow) -> RowOutcome {
        let row = link_row.row;
        let raw = match link_row.link.as_deref().map(str::trim) {
            None | Some("") => {
                tracing::info!("Row {}: No link, leaving output empty", row);
                return RowOutcome::Empty;
            }
            Some(raw) => raw,
        };

        tracing::info!("Row {}: Processing link: {}", row, preview(raw));

        let Some(doc_id) = resolve(raw) else {
            tracing::warn!("Row {}: Could not extract document ID from link", row);
            return RowOutcome::InvalidLink;
        };

        match self.documents.fetch_document(&doc_id).await {
            Ok(document) => {
                let mut text = flatten(&document);
                if text.is_empty() {
                    tracing::warn!("Row {}: Document {} has no text", row, doc_id);
                    return RowOutcome::EmptyContent;
                }

                if truncate_chars(&mut text, MAX_CELL_CHARS) {
                    tracing::warn!(
                        "Row {}: Text truncated to {} characters to fit in a cell",
                        row,
                        MAX_CELL_CHARS
                    );
                }
                tracing::info!(
                    "Row {}: Extracted {} characters from '{}'",
                    row,
                    text.chars().count(),
                    document.title
                );
                RowOutcome::Content(text)
            }
            Err(e) => {
                tracing::error!("Row {}: Failed to get document {}: {}", row, doc_id, e);
                RowOutcome::FetchFailed(e.to_string())
            }
        }
    }

    #[cfg(test)]
    fn sheets(&self) -> &S {
        &self.sheets
    }

    #[cfg(test)]
    fn documents(&self) -> &D {
        &self.documents
    }
}

fn preview(link: &str) -> String {
    let mut shown: String = link.chars().take(LINK_PREVIEW_CHARS).collect();
    if shown.len() < link.len() {
        shown.push_str("...");
    }
    shown
}
