// This is the entry point of the sheet/document sync tool.
//
// **Architecture Overview:**
// - `core/` = Business logic (no HTTP anywhere)
// - `infra/` = Implementations of core traits (Google auth, Sheets, Docs)
// - `config` = Environment-driven settings
//
// This file's job is to:
// 1. Load configuration
// 2. Authorize against Google
// 3. Wire the clients into the sync service and run one pass

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::core::auth::TokenProvider;
use crate::core::sync::SyncService;
use crate::infra::google_auth::{InstalledAppAuth, ServiceAccountAuth};
use crate::infra::google_docs::GoogleDocsClient;
use crate::infra::google_sheets::GoogleSheetsClient;

// Rows are processed strictly in order, so one thread is all we need.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;

    // ========================================================================
    // AUTHORIZATION
    // ========================================================================
    tracing::info!("Authenticating with Google API...");

    let auth: Arc<dyn TokenProvider> = match &config.service_account_key {
        Some(key_path) => {
            let account = ServiceAccountAuth::from_file(key_path)
                .await
                .with_context(|| {
                    format!("Failed to load service account key {}", key_path.display())
                })?;
            tracing::info!("Using service account {}", account.client_email());
            Arc::new(account)
        }
        None => {
            let app = InstalledAppAuth::from_files(&config.credentials_file, &config.token_file)
                .await
                .with_context(|| {
                    format!(
                        "Failed to load OAuth client from {}. Download it from Google Cloud \
                         Console and enable the Sheets and Docs APIs",
                        config.credentials_file.display()
                    )
                })?;
            Arc::new(app)
        }
    };

    // Fail fast: nothing below works without a token.
    auth.access_token()
        .await
        .context("Authorization with Google failed")?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    tracing::info!("Building Google API clients...");
    let sheets = GoogleSheetsClient::new(config.spreadsheet_id.clone(), Arc::clone(&auth));
    let documents = GoogleDocsClient::new(auth);

    tracing::info!(
        "Syncing spreadsheet {}: column {} -> column {}",
        config.spreadsheet_id,
        config.sync.input_column,
        config.sync.output_column
    );

    let service = SyncService::new(sheets, documents, config.sync);
    let summary = service.run().await?;

    tracing::info!("Done: {}", summary);
    if !summary.writes.dropped_rows.is_empty() {
        tracing::warn!(
            "Rows not written this run: {:?}",
            summary.writes.dropped_rows
        );
    }

    Ok(())
}
