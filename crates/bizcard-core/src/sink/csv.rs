//! CSV serialization of flattened rows.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::Row;

/// CSV column order; matches the `Row` field order.
const HEADER: [&str; 6] = [
    "card_number",
    "file_name",
    "field_name",
    "value",
    "confidence",
    "extracted_at",
];

/// Serialize rows as UTF-8 CSV. The header row is always present, even
/// for an empty batch.
pub fn write_csv(rows: &[Row]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())).into())
}

/// Parse CSV bytes produced by [`write_csv`] back into rows.
pub fn read_csv(bytes: &[u8]) -> Result<Vec<Row>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Report file name embedding the export timestamp, e.g.
/// `business_cards_20240601_120000.csv`.
pub fn report_file_name(at: DateTime<Utc>) -> String {
    format!("business_cards_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_rows() -> Vec<Row> {
        let at: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
        vec![
            Row {
                card_number: 1,
                file_name: "a.jpg".to_string(),
                field_name: "Name".to_string(),
                value: "Jane Doe".to_string(),
                confidence: 0.98,
                extracted_at: at,
            },
            Row {
                card_number: 1,
                file_name: "a.jpg".to_string(),
                field_name: "Address".to_string(),
                value: "1 Main St, Springfield".to_string(),
                confidence: 0.87,
                extracted_at: at,
            },
        ]
    }

    #[test]
    fn test_header_and_column_order() {
        let bytes = write_csv(&sample_rows()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "card_number,file_name,field_name,value,confidence,extracted_at"
        );
    }

    #[test]
    fn test_round_trip() {
        let rows = sample_rows();
        let bytes = write_csv(&rows).unwrap();
        let parsed = read_csv(&bytes).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_values_with_commas_round_trip() {
        let mut rows = sample_rows();
        rows[0].value = "Doe, Jane \"JD\"".to_string();
        let bytes = write_csv(&rows).unwrap();
        assert_eq!(read_csv(&bytes).unwrap(), rows);
    }

    #[test]
    fn test_empty_batch_still_has_header() {
        let bytes = write_csv(&[]).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert_eq!(
            text.trim_end(),
            "card_number,file_name,field_name,value,confidence,extracted_at"
        );
        assert!(read_csv(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_report_file_name_embeds_timestamp() {
        let at: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
        assert_eq!(report_file_name(at), "business_cards_20240601_120000.csv");
    }
}
