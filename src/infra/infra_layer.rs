// The infra module contains implementations of core traits.
// Everything that talks to Google lives here.

#[path = "google_auth/mod.rs"]
pub mod google_auth;

#[path = "google_docs/mod.rs"]
pub mod google_docs;

#[path = "google_sheets/mod.rs"]
pub mod google_sheets;
