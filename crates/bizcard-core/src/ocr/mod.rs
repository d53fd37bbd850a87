//! OCR service boundary.
//!
//! The orchestrator only needs [`CardAnalyzer`]; the Azure-backed
//! implementation lives in [`azure`].

pub mod azure;

pub use azure::AzureCardAnalyzer;

use crate::analysis::AnalyzeResult;
use crate::error::AnalyzeError;

/// External field-extraction service for one document.
pub trait CardAnalyzer {
    /// Analyze one document's bytes. `suffix` is the file-type extension
    /// without the leading dot (e.g. `jpg`, `pdf`).
    fn analyze(&self, bytes: &[u8], suffix: &str) -> Result<AnalyzeResult, AnalyzeError>;
}
