// Google Docs integration.
//
// This module lives in the infra layer because it handles external I/O
// (HTTP requests to Google APIs). The core only knows about RichDocument;
// it doesn't care where the structure comes from.

pub mod google_docs_client;

pub use google_docs_client::GoogleDocsClient;
