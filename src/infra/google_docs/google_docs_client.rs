// =============================================================================
// GOOGLE DOCS CLIENT
// =============================================================================
//
// Fetches a document through the Docs API and maps the JSON body into the
// core's RichDocument. The API marks element kinds by which optional field is
// present (`paragraph`, `table`, `sectionBreak`, ...); we turn that into the
// Block enum here so nothing downstream has to probe for fields.
//
// Only the document body is read. Headers, footers, footnotes and inline
// objects are not part of the output.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::core::auth::TokenProvider;
use crate::core::documents::{
    Block, DocumentError, DocumentId, DocumentsClient, Paragraph, RichDocument, Table, TableCell,
    TableRow,
};

// =============================================================================
// GOOGLE DOCS API RESPONSE STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiDocument {
    #[serde(default)]
    title: String,
    body: Option<ApiBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiBody {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuralElement {
    paragraph: Option<ApiParagraph>,
    table: Option<ApiTable>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiParagraph {
    #[serde(default)]
    elements: Vec<ParagraphElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParagraphElement {
    text_run: Option<TextRun>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextRun {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTable {
    #[serde(default)]
    table_rows: Vec<ApiTableRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTableRow {
    #[serde(default)]
    table_cells: Vec<ApiTableCell>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTableCell {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

// =============================================================================
// MAPPING
// =============================================================================

impl From<ApiDocument> for RichDocument {
    fn from(api: ApiDocument) -> Self {
        let blocks = api
            .body
            .map(|body| body.content.into_iter().filter_map(map_block).collect())
            .unwrap_or_default();

        RichDocument {
            title: api.title,
            blocks,
        }
    }
}

/// Paragraphs and tables survive; every other element kind is dropped.
fn map_block(element: StructuralElement) -> Option<Block> {
    if let Some(paragraph) = element.paragraph {
        return Some(Block::Paragraph(map_paragraph(paragraph)));
    }

    element.table.map(|table| {
        Block::Table(Table {
            rows: table.table_rows.into_iter().map(map_row).collect(),
        })
    })
}

fn map_paragraph(paragraph: ApiParagraph) -> Paragraph {
    Paragraph::new(
        paragraph
            .elements
            .into_iter()
            .filter_map(|element| element.text_run.and_then(|run| run.content)),
    )
}

fn map_row(row: ApiTableRow) -> TableRow {
    TableRow {
        cells: row
            .table_cells
            .into_iter()
            .map(|cell| TableCell {
                // Nested tables inside a cell are not flattened.
                paragraphs: cell
                    .content
                    .into_iter()
                    .filter_map(|element| element.paragraph.map(map_paragraph))
                    .collect(),
            })
            .collect(),
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct GoogleDocsClient {
    client: Client,
    auth: Arc<dyn TokenProvider>,
    base_url: String,
}

impl GoogleDocsClient {
    pub fn new(auth: Arc<dyn TokenProvider>) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: "https://docs.googleapis.com/v1".to_string(),
        }
    }
}

#[async_trait]
impl DocumentsClient for GoogleDocsClient {
    async fn fetch_document(&self, id: &DocumentId) -> Result<RichDocument, DocumentError> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| DocumentError::Auth(e.to_string()))?;

        let url = format!("{}/documents/{}", self.base_url, id);
        tracing::debug!("Fetching Google Doc via API: {}", id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| DocumentError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| DocumentError::Transport(e.to_string()))?;
            return Err(DocumentError::Api { status, body });
        }

        let document: ApiDocument = response
            .json()
            .await
            .map_err(|e| DocumentError::Transport(e.to_string()))?;

        Ok(document.into())
    }
}
