//! Document-analysis result model.
//!
//! The analysis service returns a tree-shaped, weakly-typed result where a
//! field's value may be a scalar, a composite record (person name, postal
//! address), or a list of either, with confidence attached both at the
//! field level and at the item level. This module gives that tree an
//! explicit shape so the flattening adapter can match on it exhaustively
//! instead of probing for attributes.

use serde_json::Value;

/// A field value in one of the three shapes the service produces.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Plain string value.
    Scalar(String),

    /// Nested record, e.g. a person name or postal address. Entries keep
    /// the service's order.
    Composite(Vec<(String, DocumentField)>),

    /// Repeated values.
    List(Vec<DocumentField>),
}

/// One field descriptor: an optional value plus an optional confidence.
///
/// Top-level fields normally carry a confidence; nested sub-fields (e.g.
/// address parts) often do not.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentField {
    /// The extracted value, absent when the service detected the field but
    /// produced nothing for it.
    pub value: Option<FieldValue>,

    /// Service-reported confidence in [0, 1].
    pub confidence: Option<f64>,
}

impl DocumentField {
    /// A field holding a plain scalar value.
    pub fn scalar(value: impl Into<String>, confidence: Option<f64>) -> Self {
        Self {
            value: Some(FieldValue::Scalar(value.into())),
            confidence,
        }
    }

    /// The inner scalar string, if this field holds one.
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.value {
            Some(FieldValue::Scalar(s)) => Some(s),
            _ => None,
        }
    }

    /// Best-effort string form of the value, used when a field holds an
    /// unexpected nested shape. Never fails; absent values render empty.
    pub fn display_value(&self) -> String {
        match &self.value {
            None => String::new(),
            Some(FieldValue::Scalar(s)) => s.clone(),
            Some(FieldValue::Composite(entries)) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(_, field)| field.display_value())
                    .filter(|s| !s.is_empty())
                    .collect();
                parts.join(", ")
            }
            Some(FieldValue::List(items)) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| item.display_value())
                    .filter(|s| !s.is_empty())
                    .collect();
                parts.join("; ")
            }
        }
    }
}

impl FieldValue {
    /// Look up a composite entry by name.
    pub fn get(&self, name: &str) -> Option<&DocumentField> {
        match self {
            FieldValue::Composite(entries) => entries
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, field)| field),
            _ => None,
        }
    }
}

/// One analyzed document: an ordered mapping of field name to descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzedDocument {
    /// Fields in the order the service reported them.
    pub fields: Vec<(String, DocumentField)>,
}

/// The complete result of analyzing one uploaded file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzeResult {
    /// Detected documents; business card analysis typically yields one.
    pub documents: Vec<AnalyzedDocument>,
}

/// Parse the service's `analyzeResult` JSON into the typed model.
///
/// Parsing is total: nodes that match none of the known value keys fall
/// back to their `content` string, and a field with no usable value at all
/// parses as value-absent rather than erroring.
pub fn parse_analyze_result(raw: &Value) -> AnalyzeResult {
    let documents = raw
        .get("documents")
        .and_then(Value::as_array)
        .map(|docs| docs.iter().map(parse_document).collect())
        .unwrap_or_default();

    AnalyzeResult { documents }
}

fn parse_document(raw: &Value) -> AnalyzedDocument {
    let fields = raw
        .get("fields")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(name, field)| (name.clone(), parse_field(field)))
                .collect()
        })
        .unwrap_or_default();

    AnalyzedDocument { fields }
}

/// Parse one field descriptor node.
fn parse_field(raw: &Value) -> DocumentField {
    DocumentField {
        value: parse_value(raw),
        confidence: raw.get("confidence").and_then(Value::as_f64),
    }
}

/// Extract the value payload from a field node, trying the typed carriers
/// (`valueArray`, `valueObject`, `valueAddress`, `valueString`, ...) before
/// falling back to the raw `content` text.
fn parse_value(raw: &Value) -> Option<FieldValue> {
    if let Some(items) = raw.get("valueArray").and_then(Value::as_array) {
        return Some(FieldValue::List(items.iter().map(parse_field).collect()));
    }

    if let Some(entries) = raw.get("valueObject").and_then(Value::as_object) {
        let entries = entries
            .iter()
            .map(|(name, field)| (name.clone(), parse_field(field)))
            .collect();
        return Some(FieldValue::Composite(entries));
    }

    // Address parts are plain strings, not nested field descriptors.
    if let Some(parts) = raw.get("valueAddress").and_then(Value::as_object) {
        let entries = parts
            .iter()
            .filter_map(|(name, part)| {
                part.as_str()
                    .map(|s| (name.clone(), DocumentField::scalar(s, None)))
            })
            .collect();
        return Some(FieldValue::Composite(entries));
    }

    for key in ["valueString", "valuePhoneNumber", "valueCountryRegion"] {
        if let Some(s) = raw.get(key).and_then(Value::as_str) {
            return Some(FieldValue::Scalar(s.to_string()));
        }
    }

    if let Some(n) = raw.get("valueNumber").and_then(Value::as_f64) {
        return Some(FieldValue::Scalar(n.to_string()));
    }

    raw.get("content")
        .and_then(Value::as_str)
        .map(|s| FieldValue::Scalar(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_scalar_field() {
        let raw = json!({
            "documents": [{
                "fields": {
                    "JobTitles": {
                        "type": "array",
                        "valueArray": [
                            {"type": "string", "valueString": "Engineer", "confidence": 0.97}
                        ],
                        "confidence": 0.95
                    }
                }
            }]
        });

        let result = parse_analyze_result(&raw);
        assert_eq!(result.documents.len(), 1);

        let (name, field) = &result.documents[0].fields[0];
        assert_eq!(name, "JobTitles");
        assert_eq!(field.confidence, Some(0.95));

        match field.value.as_ref().unwrap() {
            FieldValue::List(items) => {
                assert_eq!(items[0].as_scalar(), Some("Engineer"));
                assert_eq!(items[0].confidence, Some(0.97));
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_contact_name_object() {
        let raw = json!({
            "type": "object",
            "valueObject": {
                "FirstName": {"type": "string", "valueString": "Jane"},
                "LastName": {"type": "string", "valueString": "Doe"}
            },
            "confidence": 0.98
        });

        let field = parse_field(&raw);
        let value = field.value.unwrap();
        assert_eq!(value.get("FirstName").unwrap().as_scalar(), Some("Jane"));
        assert_eq!(value.get("LastName").unwrap().as_scalar(), Some("Doe"));
    }

    #[test]
    fn test_parse_address_parts_are_scalars() {
        let raw = json!({
            "type": "address",
            "content": "1 Main St, Springfield",
            "valueAddress": {"road": "1 Main St", "city": "Springfield"},
            "confidence": 0.92
        });

        let field = parse_field(&raw);
        let value = field.value.unwrap();
        assert_eq!(value.get("road").unwrap().as_scalar(), Some("1 Main St"));
        assert_eq!(value.get("city").unwrap().as_scalar(), Some("Springfield"));
        assert_eq!(value.get("state"), None);
    }

    #[test]
    fn test_parse_unknown_shape_falls_back_to_content() {
        let raw = json!({
            "type": "currency",
            "content": "$12.50",
            "valueCurrency": {"amount": 12.5, "currencySymbol": "$"},
            "confidence": 0.8
        });

        // valueCurrency is not a known carrier; content wins.
        let field = parse_field(&raw);
        assert_eq!(field.as_scalar(), Some("$12.50"));
    }

    #[test]
    fn test_parse_field_without_value() {
        let field = parse_field(&json!({"type": "string", "confidence": 0.5}));
        assert!(field.value.is_none());
        assert_eq!(field.confidence, Some(0.5));
    }

    #[test]
    fn test_display_value_degrades_nested_shapes() {
        let field = DocumentField {
            value: Some(FieldValue::Composite(vec![
                ("a".to_string(), DocumentField::scalar("x", None)),
                (
                    "b".to_string(),
                    DocumentField {
                        value: Some(FieldValue::List(vec![
                            DocumentField::scalar("y", None),
                            DocumentField::scalar("z", None),
                        ])),
                        confidence: None,
                    },
                ),
            ])),
            confidence: None,
        };

        assert_eq!(field.display_value(), "x, y; z");
    }
}
