//! Remote table sink (Supabase REST).
//!
//! Pass-through operations over one hosted table: order-preserving batched
//! insert, select-all, delete-all. No retries and no transactional
//! guarantee beyond what the remote store offers; a failing insert batch
//! is surfaced with its index so the caller knows how far the write got.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BizcardError, StorageError};
use crate::models::{Row, StorageConfig};

/// A row as persisted, with the server-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRow {
    /// Primary key assigned by the remote store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(flatten)]
    pub row: Row,
}

/// Remote persistence for flattened rows.
pub trait CardStore {
    /// Append rows in order, in chunks of at most the configured batch
    /// size. Returns the number of rows written.
    fn insert(&self, rows: &[Row]) -> Result<usize, StorageError>;

    /// Fetch every persisted row.
    fn select_all(&self) -> Result<Vec<StoredRow>, StorageError>;

    /// Remove every persisted row unconditionally.
    fn delete_all(&self) -> Result<(), StorageError>;
}

/// Split `rows` into order-preserving chunks of at most `batch_size` and
/// hand each to `send` along with its 0-based batch index. Stops at the
/// first failure so the caller sees which batch was refused.
pub fn insert_in_batches<F>(
    rows: &[Row],
    batch_size: usize,
    mut send: F,
) -> Result<(), StorageError>
where
    F: FnMut(usize, &[Row]) -> Result<(), StorageError>,
{
    for (index, chunk) in rows.chunks(batch_size.max(1)).enumerate() {
        send(index, chunk)?;
    }
    Ok(())
}

/// Supabase-backed implementation of [`CardStore`].
pub struct SupabaseTable {
    client: reqwest::blocking::Client,
    base_url: String,
    key: String,
    table: String,
    batch_size: usize,
}

impl SupabaseTable {
    /// Build a client from configuration.
    pub fn new(config: &StorageConfig) -> Result<Self, BizcardError> {
        if config.url.is_empty() || config.key.is_empty() {
            return Err(BizcardError::Config(
                "Supabase url and key must be configured".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(StorageError::Request)?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            key: config.key.clone(),
            table: config.table.clone(),
            batch_size: config.insert_batch_size,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        request
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
    }

    fn post_chunk(&self, index: usize, chunk: &[Row]) -> Result<(), StorageError> {
        let response = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(chunk)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::InsertBatch {
                batch: index,
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        debug!(batch = index, rows = chunk.len(), "insert batch stored");
        Ok(())
    }
}

impl CardStore for SupabaseTable {
    fn insert(&self, rows: &[Row]) -> Result<usize, StorageError> {
        insert_in_batches(rows, self.batch_size, |index, chunk| {
            self.post_chunk(index, chunk)
        })?;
        Ok(rows.len())
    }

    fn select_all(&self) -> Result<Vec<StoredRow>, StorageError> {
        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[("select", "*")])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Select {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        response
            .json()
            .map_err(|e| StorageError::Malformed(e.to_string()))
    }

    fn delete_all(&self) -> Result<(), StorageError> {
        // Unconditional delete, expressed as "id not equal to 0" because
        // the REST interface refuses a bare filterless delete.
        let response = self
            .authorized(self.client.delete(self.table_url()))
            .query(&[("id", "neq.0")])
            .header("Prefer", "return=minimal")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Delete {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn rows(n: usize) -> Vec<Row> {
        let at: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
        (0..n)
            .map(|i| Row {
                card_number: i as u32 + 1,
                file_name: format!("card{}.jpg", i),
                field_name: "Name".to_string(),
                value: format!("Person {}", i),
                confidence: 0.9,
                extracted_at: at,
            })
            .collect()
    }

    #[test]
    fn test_insert_batching_50_50_20() {
        let all = rows(120);
        let mut sizes = Vec::new();
        let mut seen = Vec::new();

        insert_in_batches(&all, 50, |index, chunk| {
            assert_eq!(index, sizes.len());
            sizes.push(chunk.len());
            seen.extend(chunk.iter().map(|r| r.card_number));
            Ok(())
        })
        .unwrap();

        assert_eq!(sizes, vec![50, 50, 20]);
        // Order preserved across batches.
        let expected: Vec<u32> = (1..=120).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_insert_failure_reports_batch_index() {
        let all = rows(120);
        let mut calls = 0;

        let err = insert_in_batches(&all, 50, |index, _chunk| {
            calls += 1;
            if index == 1 {
                Err(StorageError::InsertBatch {
                    batch: index,
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        })
        .unwrap_err();

        // Second batch failed; third never attempted.
        assert_eq!(calls, 2);
        match err {
            StorageError::InsertBatch { batch, .. } => assert_eq!(batch, 1),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_small_batch_single_call() {
        let all = rows(3);
        let mut sizes = Vec::new();
        insert_in_batches(&all, 50, |_, chunk| {
            sizes.push(chunk.len());
            Ok(())
        })
        .unwrap();
        assert_eq!(sizes, vec![3]);
    }

    #[test]
    fn test_empty_rows_no_calls() {
        let mut calls = 0;
        insert_in_batches(&[], 50, |_, _| {
            calls += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_stored_row_deserializes_flat_record() {
        let json = serde_json::json!({
            "id": 17,
            "card_number": 1,
            "file_name": "a.jpg",
            "field_name": "Name",
            "value": "Jane Doe",
            "confidence": 0.98,
            "extracted_at": "2024-06-01T12:00:00Z"
        });

        let stored: StoredRow = serde_json::from_value(json).unwrap();
        assert_eq!(stored.id, Some(17));
        assert_eq!(stored.row.value, "Jane Doe");
    }
}
