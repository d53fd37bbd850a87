//! Error types for the bizcard-core library.

use thiserror::Error;

/// Main error type for the bizcard library.
#[derive(Error, Debug)]
pub enum BizcardError {
    /// Document analysis error.
    #[error("analysis error: {0}")]
    Analyze(#[from] AnalyzeError),

    /// Remote table storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors from the document analysis service.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// HTTP transport failure (connection, timeout).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service refused the document outright.
    #[error("service rejected the document ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The submit response carried no polling URL.
    #[error("no Operation-Location header in response")]
    MissingOperation,

    /// The service reported the analysis as failed.
    #[error("analysis failed: {0}")]
    Failed(String),

    /// Polling exhausted its attempt budget.
    #[error("analysis did not complete in time")]
    TimedOut,

    /// The response body did not match the expected shape.
    #[error("malformed analysis response: {0}")]
    Malformed(String),

    /// Failed to stage the document for upload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the remote table.
#[derive(Error, Debug)]
pub enum StorageError {
    /// HTTP transport failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// One insert batch was refused; earlier batches may have been stored.
    #[error("insert batch {batch} failed ({status}): {body}")]
    InsertBatch {
        batch: usize,
        status: u16,
        body: String,
    },

    /// Select over the table failed.
    #[error("select failed ({status}): {body}")]
    Select { status: u16, body: String },

    /// Delete over the table failed.
    #[error("delete failed ({status}): {body}")]
    Delete { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("malformed storage response: {0}")]
    Malformed(String),
}

/// Result type for the bizcard library.
pub type Result<T> = std::result::Result<T, BizcardError>;
