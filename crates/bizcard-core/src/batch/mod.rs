//! Batch orchestration.
//!
//! Drives per-file processing: each uploaded file is analyzed in turn, its
//! result flattened into rows, and its outcome recorded. One file's
//! failure never aborts the batch; the worst case is a partial batch with
//! per-file error messages.

use chrono::Utc;
use tracing::{debug, warn};

use crate::adapter::flatten_result;
use crate::models::{Batch, BatchSummary, FileOutcome, Row};
use crate::ocr::CardAnalyzer;

/// One uploaded file awaiting processing.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name, used to tag rows and errors.
    pub name: String,

    /// Raw file contents.
    pub bytes: Vec<u8>,

    /// File-type extension without the leading dot.
    pub suffix: String,
}

/// Mutable state threaded through one processing pass: the growing row
/// list, per-file outcomes, and the card counter.
#[derive(Debug)]
pub struct BatchAccumulator {
    rows: Vec<Row>,
    outcomes: Vec<FileOutcome>,
    next_card_number: u32,
}

impl Default for BatchAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchAccumulator {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            outcomes: Vec::new(),
            next_card_number: 1,
        }
    }

    /// Attempt one file: analyze, flatten, accumulate.
    ///
    /// The card number is consumed only on success, so failed files leave
    /// no gap in the sequence. Returns the number of rows the file
    /// contributed, or the recorded error message.
    pub fn process_file(
        &mut self,
        analyzer: &dyn CardAnalyzer,
        file: &UploadFile,
    ) -> Result<usize, String> {
        match analyzer.analyze(&file.bytes, &file.suffix) {
            Ok(result) => {
                let rows = flatten_result(&result, self.next_card_number, &file.name, Utc::now());
                let emitted = rows.len();
                debug!(file = %file.name, rows = emitted, "file processed");

                self.rows.extend(rows);
                self.next_card_number += 1;
                self.outcomes.push(FileOutcome {
                    file_name: file.name.clone(),
                    rows_emitted: emitted,
                    error: None,
                });
                Ok(emitted)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(file = %file.name, error = %message, "failed to process file");

                self.outcomes.push(FileOutcome {
                    file_name: file.name.clone(),
                    rows_emitted: 0,
                    error: Some(message.clone()),
                });
                Err(message)
            }
        }
    }

    /// Close the pass and compute summary metrics.
    pub fn finish(self) -> Batch {
        let files_submitted = self.outcomes.len();
        let cards_processed = (self.next_card_number - 1) as usize;

        let success_rate = if files_submitted == 0 {
            0
        } else {
            (cards_processed as f64 / files_submitted as f64 * 100.0).round() as u32
        };

        Batch {
            rows: self.rows,
            outcomes: self.outcomes,
            summary: BatchSummary {
                files_submitted,
                cards_processed,
                success_rate,
            },
        }
    }
}

/// Process a sequence of files to completion and return the batch.
pub fn process_batch(analyzer: &dyn CardAnalyzer, files: &[UploadFile]) -> Batch {
    let mut acc = BatchAccumulator::new();
    for file in files {
        // Outcome already recorded; keep going regardless.
        let _ = acc.process_file(analyzer, file);
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalyzeResult, AnalyzedDocument, DocumentField};
    use crate::error::AnalyzeError;
    use std::cell::RefCell;

    /// Scripted analyzer: answers each call from a queue.
    struct StubAnalyzer {
        responses: RefCell<Vec<Result<AnalyzeResult, AnalyzeError>>>,
    }

    impl StubAnalyzer {
        fn new(responses: Vec<Result<AnalyzeResult, AnalyzeError>>) -> Self {
            Self {
                responses: RefCell::new(responses),
            }
        }
    }

    impl CardAnalyzer for StubAnalyzer {
        fn analyze(&self, _bytes: &[u8], _suffix: &str) -> Result<AnalyzeResult, AnalyzeError> {
            self.responses.borrow_mut().remove(0)
        }
    }

    fn two_field_result() -> AnalyzeResult {
        AnalyzeResult {
            documents: vec![AnalyzedDocument {
                fields: vec![
                    (
                        "CompanyNames".to_string(),
                        DocumentField::scalar("Contoso", Some(0.9)),
                    ),
                    (
                        "JobTitles".to_string(),
                        DocumentField::scalar("Engineer", Some(0.8)),
                    ),
                ],
            }],
        }
    }

    fn upload(name: &str) -> UploadFile {
        UploadFile {
            name: name.to_string(),
            bytes: vec![0u8; 4],
            suffix: "jpg".to_string(),
        }
    }

    #[test]
    fn test_card_number_increments_per_file_not_per_row() {
        let analyzer = StubAnalyzer::new(vec![Ok(two_field_result()), Ok(two_field_result())]);
        let batch = process_batch(&analyzer, &[upload("a.jpg"), upload("b.jpg")]);

        let numbers: Vec<u32> = batch.rows.iter().map(|r| r.card_number).collect();
        assert_eq!(numbers, vec![1, 1, 2, 2]);
    }

    #[test]
    fn test_failed_file_does_not_abort_batch() {
        let analyzer = StubAnalyzer::new(vec![
            Ok(two_field_result()),
            Err(AnalyzeError::TimedOut),
            Ok(two_field_result()),
        ]);
        let batch = process_batch(
            &analyzer,
            &[upload("a.jpg"), upload("b.jpg"), upload("c.jpg")],
        );

        assert_eq!(batch.summary.files_submitted, 3);
        assert_eq!(batch.summary.cards_processed, 2);
        assert_eq!(batch.summary.success_rate, 67);

        // Failed file consumes no card number.
        let numbers: Vec<u32> = batch.rows.iter().map(|r| r.card_number).collect();
        assert_eq!(numbers, vec![1, 1, 2, 2]);
        assert!(batch.rows.iter().all(|r| r.file_name != "b.jpg"));

        let failures: Vec<_> = batch.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].file_name, "b.jpg");
        assert!(failures[0].error.is_some());
    }

    #[test]
    fn test_empty_input_reports_zero_rate() {
        let analyzer = StubAnalyzer::new(vec![]);
        let batch = process_batch(&analyzer, &[]);

        assert_eq!(batch.summary.files_submitted, 0);
        assert_eq!(batch.summary.cards_processed, 0);
        assert_eq!(batch.summary.success_rate, 0);
        assert!(batch.rows.is_empty());
    }

    #[test]
    fn test_rounding_of_success_rate() {
        // 1 of 3 -> 33%, 2 of 3 -> 67%.
        let analyzer = StubAnalyzer::new(vec![
            Ok(two_field_result()),
            Err(AnalyzeError::TimedOut),
            Err(AnalyzeError::TimedOut),
        ]);
        let batch = process_batch(
            &analyzer,
            &[upload("a.jpg"), upload("b.jpg"), upload("c.jpg")],
        );
        assert_eq!(batch.summary.success_rate, 33);
    }

    #[test]
    fn test_outcomes_record_row_counts() {
        let analyzer = StubAnalyzer::new(vec![Ok(two_field_result())]);
        let batch = process_batch(&analyzer, &[upload("a.jpg")]);

        assert_eq!(batch.outcomes.len(), 1);
        assert!(batch.outcomes[0].succeeded());
        assert_eq!(batch.outcomes[0].rows_emitted, 2);
    }
}
