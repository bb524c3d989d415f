// Buffers output values and writes them back in batches.
//
// **Flush policy:**
// - One multi-cell write per batch (a single round trip)
// - If that fails, each pending cell is written on its own, once
// - A cell that still fails is logged and dropped for this run
// - The pending batch is cleared after every flush, whatever happened

use super::sync_models::WriteReport;
use crate::core::sheets::{CellAddress, CellUpdate, SheetsClient};

pub struct BatchWriter<'a, S: SheetsClient> {
    client: &'a S,
    sheet: String,
    column: String,
    batch_size: usize,
    pending: Vec<CellUpdate>,
    report: WriteReport,
}

impl<'a, S: SheetsClient> BatchWriter<'a, S> {
    /// A `batch_size` of zero is treated as one.
    pub fn new(client: &'a S, sheet: &str, column: &str, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            client,
            sheet: sheet.to_string(),
            column: column.to_string(),
            batch_size,
            pending: Vec::with_capacity(batch_size),
            report: WriteReport::default(),
        }
    }

    /// Queues a value for `row`, flushing when the batch is full.
    pub async fn push(&mut self, row: u32, value: String) {
        self.pending.push(CellUpdate {
            address: CellAddress {
                sheet: self.sheet.clone(),
                column: self.column.clone(),
                row,
            },
            value,
        });

        if self.pending.len() >= self.batch_size {
            self.flush().await;
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Writes whatever is pending.
    pub async fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let batch = std::mem::take(&mut self.pending);
        self.report.flushes += 1;

        match self.client.batch_write(&batch).await {
            Ok(updated) => {
                tracing::info!("Updated {} cells in column {}", updated, self.column);
                self.report.cells_written += batch.len();
            }
            Err(e) => {
                tracing::warn!(
                    "Batch write of {} cells failed ({}), writing rows one by one",
                    batch.len(),
                    e
                );
                self.write_individually(&batch).await;
            }
        }
    }

    async fn write_individually(&mut self, batch: &[CellUpdate]) {
        for update in batch {
            match self.client.write_cell(update).await {
                Ok(()) => {
                    tracing::debug!("Row {}: written individually", update.address.row);
                    self.report.cells_written += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "Row {}: failed to write {}: {}",
                        update.address.row,
                        update.address,
                        e
                    );
                    self.report.dropped_rows.push(update.address.row);
                }
            }
        }
    }

    /// Flushes the remainder and hands back the tally.
    pub async fn finish(mut self) -> WriteReport {
        tracing::debug!("Final flush with {} pending cells", self.pending_len());
        self.flush().await;
        self.report
    }
}
