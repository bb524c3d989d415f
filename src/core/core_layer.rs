// The core module contains all business logic.
// Nothing in here talks HTTP; the infra layer implements the traits declared here.

#[path = "auth/mod.rs"]
pub mod auth;

#[path = "documents/mod.rs"]
pub mod documents;

#[path = "links/mod.rs"]
pub mod links;

#[path = "sheets/mod.rs"]
pub mod sheets;

#[path = "sync/mod.rs"]
pub mod sync;
