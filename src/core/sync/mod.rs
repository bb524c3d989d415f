pub mod batch_writer;
pub mod sync_models;
pub mod sync_service;

#[cfg(test)]
pub mod test_support;

pub use sync_models::{SyncConfig, SyncSummary, DEFAULT_BATCH_SIZE};
pub use sync_service::{SyncError, SyncService};
