//! Data models: configuration and the normalized row/batch types.

pub mod config;
pub mod row;

pub use config::{AzureConfig, BizcardConfig, StorageConfig};
pub use row::{Batch, BatchSummary, FileOutcome, Row};
