//! Required-field validation for candidate records.

use crate::record::SourceRecord;
use tracing::debug;

/// Partition records into those carrying a usable foreign-key field and a
/// count of those that do not.
///
/// A record is valid iff `fk_field` is present, non-null, and not an empty
/// string. Invalid records are dropped from the insertion path; whether the
/// count triggers an operator prompt is the driver's decision.
pub fn partition(records: Vec<SourceRecord>, fk_field: &str) -> (Vec<SourceRecord>, usize) {
    let total = records.len();
    let valid: Vec<SourceRecord> = records
        .into_iter()
        .filter(|r| r.has_non_empty(fk_field))
        .collect();
    let invalid = total - valid.len();
    if invalid > 0 {
        debug!("Dropped {invalid} record(s) with missing or empty '{fk_field}'");
    }
    (valid, invalid)
}
