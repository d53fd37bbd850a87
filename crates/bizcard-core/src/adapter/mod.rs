//! Extraction result adapter.
//!
//! Converts one document-analysis result into normalized [`Row`]s. This is
//! the only place that knows the extraction schema: the canonical contact
//! name and address fields get dedicated flattening, everything else is
//! treated uniformly as a sequence of scalar-ish items. Flattening is
//! total; an unexpected nested shape degrades to its string form instead
//! of failing the whole card.

use chrono::{DateTime, Utc};

use crate::analysis::{AnalyzeResult, DocumentField, FieldValue};
use crate::models::Row;

/// Field key the service uses for detected contact names.
pub const CONTACT_NAMES_FIELD: &str = "ContactNames";

/// Field key the service uses for detected postal addresses.
pub const ADDRESSES_FIELD: &str = "Addresses";

/// Address parts emitted into the flattened value, in output order.
const ADDRESS_PARTS: [&str; 3] = ["road", "city", "state"];

/// Flatten one analysis result into rows.
///
/// `card_number` is the 1-based sequence number of the source file; every
/// row produced here carries it, along with `file_name` and the shared
/// `extracted_at` instant.
pub fn flatten_result(
    result: &AnalyzeResult,
    card_number: u32,
    file_name: &str,
    extracted_at: DateTime<Utc>,
) -> Vec<Row> {
    let mut rows = Vec::new();

    for document in &result.documents {
        for (field_name, field) in &document.fields {
            let Some(value) = &field.value else {
                continue;
            };

            match field_name.as_str() {
                CONTACT_NAMES_FIELD => {
                    for person in as_items(field, value) {
                        rows.push(Row {
                            card_number,
                            file_name: file_name.to_string(),
                            field_name: "Name".to_string(),
                            value: person_name(person),
                            confidence: confidence_of(person, field),
                            extracted_at,
                        });
                    }
                }
                ADDRESSES_FIELD => {
                    for address in as_items(field, value) {
                        rows.push(Row {
                            card_number,
                            file_name: file_name.to_string(),
                            field_name: "Address".to_string(),
                            value: address_line(address),
                            confidence: confidence_of(address, field),
                            extracted_at,
                        });
                    }
                }
                _ => {
                    for item in as_items(field, value) {
                        rows.push(Row {
                            card_number,
                            file_name: file_name.to_string(),
                            field_name: field_name.clone(),
                            value: item.display_value(),
                            confidence: confidence_of(item, field),
                            extracted_at,
                        });
                    }
                }
            }
        }
    }

    rows
}

/// View a field's value as a sequence of items: a list yields its items,
/// anything else yields the field itself as a one-element sequence.
fn as_items<'a>(field: &'a DocumentField, value: &'a FieldValue) -> Vec<&'a DocumentField> {
    match value {
        FieldValue::List(items) => items.iter().collect(),
        _ => vec![field],
    }
}

/// Two-step confidence lookup: the item's own confidence when present,
/// else the field's aggregate confidence.
fn confidence_of(item: &DocumentField, field: &DocumentField) -> f64 {
    round2(item.confidence.or(field.confidence).unwrap_or(0.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `"<first> <last>"` with absent parts empty, trimmed so a missing part
/// leaves no stray space.
fn person_name(person: &DocumentField) -> String {
    let first = sub_scalar(person, "FirstName");
    let last = sub_scalar(person, "LastName");
    format!("{} {}", first, last).trim().to_string()
}

/// Join the non-empty address parts with `", "`, preserving road, city,
/// state order.
fn address_line(address: &DocumentField) -> String {
    let parts: Vec<&str> = ADDRESS_PARTS
        .into_iter()
        .map(|part| sub_scalar(address, part))
        .filter(|s| !s.is_empty())
        .collect();
    parts.join(", ")
}

/// Scalar string of a composite sub-field, empty when the sub-field is
/// absent or not a scalar.
fn sub_scalar<'a>(field: &'a DocumentField, name: &str) -> &'a str {
    field
        .value
        .as_ref()
        .and_then(|value| value.get(name))
        .and_then(|sub| sub.as_scalar())
        .unwrap_or("")
}
