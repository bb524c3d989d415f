// Deploy-time configuration, read from the environment (and `.env`).

use std::path::PathBuf;

use thiserror::Error;

use crate::core::sheets::a1::normalize_column;
use crate::core::sync::{SyncConfig, DEFAULT_BATCH_SIZE};

const DEFAULT_SPREADSHEET_ID: &str = "1u1W9nV26a8-nvEx8R_bN6tEm3PrK6Z3O6A2YYXlPSLw";
const DEFAULT_INPUT_COLUMN: &str = "R";
const DEFAULT_OUTPUT_COLUMN: &str = "S";
const DEFAULT_TOKEN_FILE: &str = "google_api_token.json";
const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be column letters like R or AB, got '{value}'")]
    InvalidColumn { name: &'static str, value: String },
    #[error("INPUT_COLUMN and OUTPUT_COLUMN must differ (both are {0})")]
    SameColumns(String),
    #[error("BATCH_SIZE must be a positive integer, got '{0}'")]
    InvalidBatchSize(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub spreadsheet_id: String,
    pub sync: SyncConfig,
    pub token_file: PathBuf,
    pub credentials_file: PathBuf,
    /// When set, a service account replaces the interactive user flow.
    pub service_account_key: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let spreadsheet_id =
            get("SPREADSHEET_ID").unwrap_or_else(|| DEFAULT_SPREADSHEET_ID.to_string());

        let input_column = column(
            "INPUT_COLUMN",
            get("INPUT_COLUMN").as_deref().unwrap_or(DEFAULT_INPUT_COLUMN),
        )?;
        let output_column = column(
            "OUTPUT_COLUMN",
            get("OUTPUT_COLUMN").as_deref().unwrap_or(DEFAULT_OUTPUT_COLUMN),
        )?;
        if input_column == output_column {
            return Err(ConfigError::SameColumns(input_column));
        }

        let batch_size = match get("BATCH_SIZE") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => return Err(ConfigError::InvalidBatchSize(raw)),
            },
            None => DEFAULT_BATCH_SIZE,
        };

        Ok(Self {
            spreadsheet_id,
            sync: SyncConfig {
                sheet_name: get("SHEET_NAME"),
                input_column,
                output_column,
                batch_size,
            },
            token_file: get("GOOGLE_TOKEN_FILE")
                .unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string())
                .into(),
            credentials_file: get("GOOGLE_CREDENTIALS_FILE")
                .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string())
                .into(),
            service_account_key: get("GOOGLE_SERVICE_ACCOUNT_KEY").map(PathBuf::from),
        })
    }
}

fn column(name: &'static str, value: &str) -> Result<String, ConfigError> {
    normalize_column(value).ok_or_else(|| ConfigError::InvalidColumn {
        name,
        value: value.to_string(),
    })
}
