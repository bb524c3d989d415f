// Sheets API v4 client bound to one spreadsheet.
// It exposes only the calls the sync needs.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::auth::TokenProvider;
use crate::core::sheets::{
    CellLinkMetadata, CellUpdate, ColumnRange, SheetError, SheetRef, SheetsClient,
};

const LINK_METADATA_FIELDS: &str = "sheets(data(rowData(values(formattedValue,hyperlink,userEnteredValue(formulaValue),textFormatRuns(format(link(uri)))))))";

pub struct GoogleSheetsClient {
    client: Client,
    auth: Arc<dyn TokenProvider>,
    base_url: String,
    spreadsheet_id: String,
}

impl GoogleSheetsClient {
    pub fn new(spreadsheet_id: impl Into<String>, auth: Arc<dyn TokenProvider>) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: "https://sheets.googleapis.com/v4".to_string(),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/spreadsheets/{}", self.base_url, self.spreadsheet_id)
    }

    /// `.../values/<range>` with the range percent-encoded as one path segment.
    fn values_url(&self, range: &str) -> Result<Url, SheetError> {
        let mut url = Url::parse(&format!("{}/values", self.spreadsheet_url()))
            .map_err(|e| SheetError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SheetError::Transport("cannot build values URL".to_string()))?
            .push(range);
        Ok(url)
    }

    /// Attaches a fresh bearer token, sends, and decodes a JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SheetError> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| SheetError::Auth(e.to_string()))?;

        let response = request
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| SheetError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| SheetError::Transport(e.to_string()))?;
            return Err(SheetError::Api { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| SheetError::Transport(e.to_string()))
    }
}

#[async_trait]
impl SheetsClient for GoogleSheetsClient {
    async fn find_sheet(&self, name: Option<&str>) -> Result<SheetRef, SheetError> {
        let request = self
            .client
            .get(self.spreadsheet_url())
            .query(&[("fields", "sheets.properties(sheetId,title)")]);
        let spreadsheet: ApiSpreadsheet = self.send(request).await?;
        pick_sheet(spreadsheet, name)
    }

    async fn read_column(&self, range: &ColumnRange) -> Result<Vec<String>, SheetError> {
        let request = self.client.get(self.values_url(&range.to_string())?);
        let values: ApiValueRange = self.send(request).await?;
        Ok(first_cells(values))
    }

    async fn read_link_metadata(
        &self,
        range: &ColumnRange,
    ) -> Result<Vec<CellLinkMetadata>, SheetError> {
        let request = self.client.get(self.spreadsheet_url()).query(&[
            ("ranges", range.to_string().as_str()),
            ("includeGridData", "true"),
            ("fields", LINK_METADATA_FIELDS),
        ]);
        let spreadsheet: ApiGridSpreadsheet = self.send(request).await?;
        Ok(link_metadata(spreadsheet))
    }

    async fn batch_write(&self, updates: &[CellUpdate]) -> Result<usize, SheetError> {
        let body = ApiBatchUpdateRequest {
            value_input_option: "RAW",
            data: updates.iter().map(ApiValueRangeWrite::from).collect(),
        };

        let request = self
            .client
            .post(format!("{}/values:batchUpdate", self.spreadsheet_url()))
            .json(&body);
        let response: ApiBatchUpdateResponse = self.send(request).await?;
        Ok(response.total_updated_cells.unwrap_or_default())
    }

    async fn write_cell(&self, update: &CellUpdate) -> Result<(), SheetError> {
        let body = ApiValueRangeWrite::from(update);
        let request = self
            .client
            .put(self.values_url(&body.range)?)
            .query(&[("valueInputOption", "RAW")])
            .json(&body);
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }
}

// =============================================================================
// RESPONSE MAPPING
// =============================================================================

fn pick_sheet(spreadsheet: ApiSpreadsheet, name: Option<&str>) -> Result<SheetRef, SheetError> {
    let mut sheets = spreadsheet
        .sheets
        .into_iter()
        .filter_map(|sheet| sheet.properties)
        .map(|props| SheetRef {
            sheet_id: props.sheet_id.unwrap_or_default(),
            title: props.title.unwrap_or_default(),
        });

    match name {
        Some(name) => sheets
            .find(|sheet| sheet.title == name)
            .ok_or_else(|| SheetError::SheetNotFound(name.to_string())),
        None => sheets.next().ok_or(SheetError::NoSheets),
    }
}

fn first_cells(range: ApiValueRange) -> Vec<String> {
    range
        .values
        .into_iter()
        .map(|row| match row.into_iter().next() {
            Some(serde_json::Value::String(text)) => text,
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
        .collect()
}

fn link_metadata(spreadsheet: ApiGridSpreadsheet) -> Vec<CellLinkMetadata> {
    spreadsheet
        .sheets
        .into_iter()
        .flat_map(|sheet| sheet.data)
        .flat_map(|grid| grid.row_data)
        .map(|row| {
            row.values
                .into_iter()
                .next()
                .map(CellLinkMetadata::from)
                .unwrap_or_default()
        })
        .collect()
}

impl From<ApiCellData> for CellLinkMetadata {
    fn from(cell: ApiCellData) -> Self {
        CellLinkMetadata {
            hyperlink: cell.hyperlink,
            text_run_links: cell
                .text_format_runs
                .into_iter()
                .filter_map(|run| run.format.and_then(|f| f.link).and_then(|l| l.uri))
                .collect(),
            formula: cell.user_entered_value.and_then(|v| v.formula_value),
            formatted_value: cell.formatted_value,
        }
    }
}

impl From<&CellUpdate> for ApiValueRangeWrite {
    fn from(update: &CellUpdate) -> Self {
        ApiValueRangeWrite {
            range: update.address.to_string(),
            major_dimension: "ROWS",
            values: vec![vec![update.value.clone()]],
        }
    }
}

// =============================================================================
// SHEETS API STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiSpreadsheet {
    #[serde(default)]
    sheets: Vec<ApiSheet>,
}

#[derive(Debug, Deserialize)]
struct ApiSheet {
    properties: Option<ApiSheetProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSheetProperties {
    sheet_id: Option<i64>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ApiGridSpreadsheet {
    #[serde(default)]
    sheets: Vec<ApiGridSheet>,
}

#[derive(Debug, Deserialize)]
struct ApiGridSheet {
    #[serde(default)]
    data: Vec<ApiGridData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiGridData {
    #[serde(default)]
    row_data: Vec<ApiRowData>,
}

#[derive(Debug, Deserialize)]
struct ApiRowData {
    #[serde(default)]
    values: Vec<ApiCellData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCellData {
    formatted_value: Option<String>,
    hyperlink: Option<String>,
    user_entered_value: Option<ApiExtendedValue>,
    #[serde(default)]
    text_format_runs: Vec<ApiTextFormatRun>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiExtendedValue {
    formula_value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTextFormatRun {
    format: Option<ApiTextFormat>,
}

#[derive(Debug, Deserialize)]
struct ApiTextFormat {
    link: Option<ApiLink>,
}

#[derive(Debug, Deserialize)]
struct ApiLink {
    uri: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiBatchUpdateRequest {
    value_input_option: &'static str,
    data: Vec<ApiValueRangeWrite>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiValueRangeWrite {
    range: String,
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiBatchUpdateResponse {
    total_updated_cells: Option<usize>,
}
