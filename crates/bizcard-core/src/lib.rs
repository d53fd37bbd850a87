//! Core library for business card OCR processing.
//!
//! This crate provides:
//! - A typed model for document-analysis results (scalar / composite /
//!   list field values with two-level confidence)
//! - The extraction result adapter that flattens a result into rows
//! - Batch orchestration with per-file error recovery and summary metrics
//! - Sinks: CSV export and a remote table (Supabase REST)

pub mod adapter;
pub mod analysis;
pub mod batch;
pub mod error;
pub mod models;
pub mod ocr;
pub mod sink;

pub use adapter::{ADDRESSES_FIELD, CONTACT_NAMES_FIELD, flatten_result};
pub use analysis::{AnalyzeResult, AnalyzedDocument, DocumentField, FieldValue};
pub use batch::{BatchAccumulator, UploadFile, process_batch};
pub use error::{AnalyzeError, BizcardError, Result, StorageError};
pub use models::{Batch, BatchSummary, BizcardConfig, FileOutcome, Row};
pub use ocr::{AzureCardAnalyzer, CardAnalyzer};
pub use sink::{CardStore, StoredRow, SupabaseTable, report_file_name, write_csv};
