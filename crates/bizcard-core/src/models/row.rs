//! Normalized row and batch models.
//!
//! A [`Row`] is one flattened (field, value) observation from a business
//! card; a [`Batch`] is everything produced by one processing pass over a
//! set of uploaded files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One normalized extraction observation, ready for display, CSV export,
/// or remote persistence.
///
/// Field order here is the CSV column order; do not reorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// 1-based sequence number of the source file within the batch.
    /// All rows from one file share the same number.
    pub card_number: u32,

    /// Name of the uploaded file this row came from.
    pub file_name: String,

    /// Canonical field label ("Name", "Address") or the service's raw
    /// field key.
    pub field_name: String,

    /// Flattened scalar value.
    pub value: String,

    /// Service-reported confidence in [0, 1], rounded to 2 decimals.
    pub confidence: f64,

    /// When this row was produced.
    pub extracted_at: DateTime<Utc>,
}

/// Outcome of attempting one uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Name of the attempted file.
    pub file_name: String,

    /// Number of rows the file contributed.
    pub rows_emitted: usize,

    /// Error message when the analysis call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    /// Whether the file was analyzed successfully.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate counters over one processing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of files submitted for processing.
    pub files_submitted: usize,

    /// Number of files successfully analyzed.
    pub cards_processed: usize,

    /// `cards_processed / files_submitted` as a percentage rounded to the
    /// nearest integer; 0 when no files were submitted.
    pub success_rate: u32,
}

/// The full result of one upload-and-process interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// All rows, in file order then field order.
    pub rows: Vec<Row>,

    /// Per-file success/failure log, in submission order.
    pub outcomes: Vec<FileOutcome>,

    /// Aggregate counters.
    pub summary: BatchSummary,
}

impl Batch {
    /// Outcomes for files whose analysis failed.
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }
}
