// In-memory collaborators for the sync tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::documents::{DocumentError, DocumentId, DocumentsClient, RichDocument};
use crate::core::sheets::{
    CellLinkMetadata, CellUpdate, ColumnRange, SheetError, SheetRef, SheetsClient,
};

#[derive(Default)]
struct FakeSheetsLog {
    ranges_read: Vec<String>,
    batch_attempts: Vec<Vec<u32>>,
    single_attempts: Vec<u32>,
    written: Vec<CellUpdate>,
}

/// Spreadsheet fake with scriptable failures. Records every write attempt.
pub struct FakeSheets {
    sheets: Vec<SheetRef>,
    column: Vec<String>,
    metadata: Option<Vec<CellLinkMetadata>>,
    fail_reads: bool,
    fail_batches: bool,
    fail_rows: HashSet<u32>,
    log: Mutex<FakeSheetsLog>,
}

impl FakeSheets {
    pub fn new() -> Self {
        Self {
            sheets: vec![SheetRef {
                sheet_id: 0,
                title: "Sheet1".to_string(),
            }],
            column: Vec::new(),
            metadata: Some(Vec::new()),
            fail_reads: false,
            fail_batches: false,
            fail_rows: HashSet::new(),
            log: Mutex::new(FakeSheetsLog::default()),
        }
    }

    pub fn with_sheets(mut self, titles: &[&str]) -> Self {
        self.sheets = titles
            .iter()
            .enumerate()
            .map(|(i, title)| SheetRef {
                sheet_id: i as i64 * 100,
                title: title.to_string(),
            })
            .collect();
        self
    }

    /// Values of the link column below the header.
    pub fn with_column(mut self, values: &[&str]) -> Self {
        self.column = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn with_metadata(mut self, metadata: Vec<CellLinkMetadata>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn failing_metadata(mut self) -> Self {
        self.metadata = None;
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_batches(mut self) -> Self {
        self.fail_batches = true;
        self
    }

    pub fn failing_rows(mut self, rows: &[u32]) -> Self {
        self.fail_rows = rows.iter().copied().collect();
        self
    }

    pub fn ranges_read(&self) -> Vec<String> {
        self.log.lock().unwrap().ranges_read.clone()
    }

    pub fn batch_attempts(&self) -> Vec<Vec<u32>> {
        self.log.lock().unwrap().batch_attempts.clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_attempts().iter().map(Vec::len).collect()
    }

    pub fn single_write_attempts(&self) -> Vec<u32> {
        self.log.lock().unwrap().single_attempts.clone()
    }

    /// Every cell that was successfully written, in write order.
    pub fn written(&self) -> Vec<CellUpdate> {
        self.log.lock().unwrap().written.clone()
    }

    fn failure() -> SheetError {
        SheetError::Api {
            status: 500,
            body: "backend error".to_string(),
        }
    }
}

#[async_trait]
impl SheetsClient for FakeSheets {
    async fn find_sheet(&self, name: Option<&str>) -> Result<SheetRef, SheetError> {
        match name {
            Some(name) => self
                .sheets
                .iter()
                .find(|s| s.title == name)
                .cloned()
                .ok_or_else(|| SheetError::SheetNotFound(name.to_string())),
            None => self.sheets.first().cloned().ok_or(SheetError::NoSheets),
        }
    }

    async fn read_column(&self, range: &ColumnRange) -> Result<Vec<String>, SheetError> {
        self.log.lock().unwrap().ranges_read.push(range.to_string());
        if self.fail_reads {
            return Err(Self::failure());
        }
        Ok(self.column.clone())
    }

    async fn read_link_metadata(
        &self,
        range: &ColumnRange,
    ) -> Result<Vec<CellLinkMetadata>, SheetError> {
        self.log.lock().unwrap().ranges_read.push(range.to_string());
        self.metadata.clone().ok_or_else(Self::failure)
    }

    async fn batch_write(&self, updates: &[CellUpdate]) -> Result<usize, SheetError> {
        let mut log = self.log.lock().unwrap();
        log.batch_attempts
            .push(updates.iter().map(|u| u.address.row).collect());
        if self.fail_batches {
            return Err(Self::failure());
        }
        log.written.extend(updates.iter().cloned());
        Ok(updates.len())
    }

    async fn write_cell(&self, update: &CellUpdate) -> Result<(), SheetError> {
        let mut log = self.log.lock().unwrap();
        log.single_attempts.push(update.address.row);
        if self.fail_rows.contains(&update.address.row) {
            return Err(Self::failure());
        }
        log.written.push(update.clone());
        Ok(())
    }
}

/// Document fake that replays a fixed script of results keyed by document ID.
pub struct FakeDocuments {
    script: HashMap<String, Result<RichDocument, String>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeDocuments {
    pub fn new() -> Self {
        Self {
            script: HashMap::new(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn with_document(mut self, id: &str, document: RichDocument) -> Self {
        self.script.insert(id.to_string(), Ok(document));
        self
    }

    pub fn with_failure(mut self, id: &str, message: &str) -> Self {
        self.script.insert(id.to_string(), Err(message.to_string()));
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentsClient for FakeDocuments {
    async fn fetch_document(&self, id: &DocumentId) -> Result<RichDocument, DocumentError> {
        self.fetched.lock().unwrap().push(id.to_string());
        match self.script.get(id.as_str()) {
            Some(Ok(document)) => Ok(document.clone()),
            Some(Err(message)) => Err(DocumentError::Transport(message.clone())),
            None => Err(DocumentError::Api {
                status: 404,
                body: format!("Requested entity was not found: {}", id),
            }),
        }
    }
}
