//! Record representations on the source and destination side.
//!
//! A [`SourceRecord`] is one JSON object from the remote source, untouched.
//! A [`DestinationRow`] is the renamed, serialized form ready to append to
//! the destination table.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single record as returned by the remote source.
///
/// Field names and values are whatever the source emitted; the column
/// mapping decides which fields survive into the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRecord {
    fields: Map<String, Value>,
}

impl SourceRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        SourceRecord { fields }
    }

    /// Raw field access. Returns `None` when the field is absent (a JSON
    /// `null` is returned as `Some(&Value::Null)`).
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The value of a lookup field, coerced to the string form used for
    /// existence comparison. Absent and `null` fields yield `None`.
    pub fn lookup_value(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            // Structured lookup values are compared by their JSON encoding,
            // matching how they are stored after normalization.
            other => serde_json::to_string(other).ok(),
        }
    }

    /// Whether `field` is present, non-null, and not an empty string.
    pub fn has_non_empty(&self, field: &str) -> bool {
        match self.fields.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Value> for SourceRecord {
    /// Convenience for tests and JSON bodies: non-object values become an
    /// empty record, which the validator then rejects.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => SourceRecord { fields },
            _ => SourceRecord { fields: Map::new() },
        }
    }
}

/// A record in destination shape: destination column names, scalar values
/// only, and an explicit id assigned from the store's id counter.
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationRow {
    id: i64,
    values: Vec<(String, Value)>,
}

impl DestinationRow {
    /// `values` must hold destination column names in mapping order.
    pub fn new(id: i64, values: Vec<(String, Value)>) -> Self {
        DestinationRow { id, values }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Destination column names in mapping order, excluding `id`.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    /// Values in the same order as [`DestinationRow::columns`].
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().map(|(_, value)| value)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> SourceRecord {
        SourceRecord::from(value)
    }

    #[test]
    fn test_lookup_value_coercion() {
        let r = record(json!({"giga_id_school": "GIGA-001", "school_id": 42, "active": true}));
        assert_eq!(r.lookup_value("giga_id_school"), Some("GIGA-001".to_string()));
        assert_eq!(r.lookup_value("school_id"), Some("42".to_string()));
        assert_eq!(r.lookup_value("active"), Some("true".to_string()));
        assert_eq!(r.lookup_value("missing"), None);
    }

    #[test]
    fn test_lookup_value_null_is_none() {
        let r = record(json!({"giga_id_school": null}));
        assert_eq!(r.lookup_value("giga_id_school"), None);
    }

    #[test]
    fn test_has_non_empty() {
        let r = record(json!({"country_code": "BR", "name": "", "flags": null}));
        assert!(r.has_non_empty("country_code"));
        assert!(!r.has_non_empty("name"));
        assert!(!r.has_non_empty("flags"));
        assert!(!r.has_non_empty("absent"));
    }

    #[test]
    fn test_non_object_json_becomes_empty_record() {
        let r = record(json!([1, 2, 3]));
        assert!(r.fields().is_empty());
    }

    #[test]
    fn test_destination_row_accessors() {
        let row = DestinationRow::new(
            7,
            vec![
                ("external_id".to_string(), json!("S-1")),
                ("name".to_string(), json!("Escola Azul")),
            ],
        );
        assert_eq!(row.id(), 7);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["external_id", "name"]);
        assert_eq!(row.get("name"), Some(&json!("Escola Azul")));
        assert_eq!(row.get("nope"), None);
    }
}
