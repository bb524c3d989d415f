// =============================================================================
// GOOGLE AUTHORIZATION
// =============================================================================
//
// Two ways to get a bearer token for the Sheets and Docs APIs:
//
// 1. **Installed app (default):**
//    - Needs the OAuth client file downloaded from Google Cloud Console
//      ("Create credentials" > "OAuth client ID" > "Desktop app")
//    - The first run prints a consent URL; the browser redirects back to a
//      loopback listener and the resulting token is cached on disk
//    - Later runs reuse or refresh the cached token
//
// 2. **Service account:**
//    - Set `GOOGLE_SERVICE_ACCOUNT_KEY` to the JSON key file
//    - Share the spreadsheet (editor) and documents (viewer) with the
//      service account email

pub mod installed_app;
pub mod service_account;
pub mod token_cache;
pub mod token_exchange;

pub use installed_app::InstalledAppAuth;
pub use service_account::ServiceAccountAuth;

/// Read/write on spreadsheets, read-only on documents.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/documents.readonly",
];

pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub(crate) fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

pub(crate) fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}
