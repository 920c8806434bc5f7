//! Turn source records into destination rows.

use crate::mapping::ColumnMapping;
use crate::record::{DestinationRow, SourceRecord};
use serde_json::Value;
use tracing::debug;

/// Rename fields per the mapping, serialize structured values, and assign
/// ids starting at `next_id`.
///
/// Only mapped fields survive; everything else the source sent is dropped.
/// Rows whose foreign-key field is null or empty are dropped here as well —
/// the validator already filters them, this is defense-in-depth for the
/// whole-dataset path and for callers that skip validation.
pub fn normalize(
    records: &[SourceRecord],
    mapping: &ColumnMapping,
    next_id: i64,
) -> Vec<DestinationRow> {
    let fk_source = mapping.fk_source_field();
    let mut rows = Vec::with_capacity(records.len());
    let mut id = next_id;

    for record in records {
        if let Some(fk) = fk_source {
            if !record.has_non_empty(fk) {
                debug!("Dropping record with empty '{fk}' during normalization");
                continue;
            }
        }

        let values = mapping
            .renames()
            .map(|(source, destination)| {
                let value = record.get(source).cloned().unwrap_or(Value::Null);
                (destination.to_string(), flatten(value))
            })
            .collect();

        rows.push(DestinationRow::new(id, values));
        id += 1;
    }

    rows
}

/// Structured values (e.g. a `feature_flags` object) are stored in a single
/// text column; scalars pass through untouched.
fn flatten(value: Value) -> Value {
    match value {
        Value::Object(_) | Value::Array(_) => {
            // Serialization of a value that itself came from JSON cannot fail.
            Value::String(serde_json::to_string(&value).unwrap_or_default())
        }
        scalar => scalar,
    }
}
