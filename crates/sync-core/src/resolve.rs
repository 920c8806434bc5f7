//! Existence resolution: which candidate records are not yet in the
//! destination.

use crate::error::ResolutionError;
use crate::mapping::ColumnMapping;
use crate::record::SourceRecord;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// The lookup-key values currently present in the destination, one set per
/// destination lookup column, snapshotted per page (or per run).
///
/// The driver layers the values it has already accepted earlier in the same
/// run on top of the database snapshot via [`ExistingKeySet::add`], so a
/// record accepted from page N is not accepted again from page N+1.
#[derive(Debug, Default)]
pub struct ExistingKeySet {
    values: HashMap<String, HashSet<String>>,
    null_columns: HashSet<String>,
}

impl ExistingKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the snapshot of one destination column. Nulls are not stored
    /// as values but remembered, so the resolver can refuse the column.
    pub fn load_column(&mut self, column: &str, snapshot: Vec<Option<String>>) {
        let set = self.values.entry(column.to_string()).or_default();
        for value in snapshot {
            match value {
                Some(v) => {
                    set.insert(v);
                }
                None => {
                    self.null_columns.insert(column.to_string());
                }
            }
        }
    }

    /// Add a single value accepted earlier in this run.
    pub fn add(&mut self, column: &str, value: String) {
        self.values.entry(column.to_string()).or_default().insert(value);
    }

    pub fn contains(&self, column: &str, value: &str) -> bool {
        self.values
            .get(column)
            .is_some_and(|set| set.contains(value))
    }

    pub fn column_has_nulls(&self, column: &str) -> bool {
        self.null_columns.contains(column)
    }
}

/// Result of one resolution pass.
#[derive(Debug)]
pub struct Resolution {
    /// Candidates whose lookup value is absent from the destination.
    pub new_records: Vec<SourceRecord>,
    /// Index of the lookup pair that decided the result; `None` when no pair
    /// yielded any new record.
    pub matched_pair: Option<usize>,
}

/// Compute the subset of `candidates` that does not already exist in the
/// destination.
///
/// Lookup pairs are tried in configured order. The first pair for which at
/// least one candidate is absent from the existing set decides: exactly the
/// candidates new under that pair are returned and later pairs are never
/// consulted. This first-match-wins tie-break is deliberate, even though it
/// only behaves intuitively with a single configured pair.
///
/// Per-pair preconditions: every candidate must carry the source lookup
/// field with a non-null value, and the destination column snapshot must be
/// null-free. A pair failing a precondition is logged and skipped; only when
/// every pair fails is the first failure returned.
pub fn resolve_new(
    candidates: &[SourceRecord],
    mapping: &ColumnMapping,
    existing: &ExistingKeySet,
) -> Result<Resolution, ResolutionError> {
    let mut first_error: Option<ResolutionError> = None;
    let mut pairs_tried = 0usize;
    let mut pairs_failed = 0usize;

    for (index, (source_field, dest_field)) in mapping.lookup_pairs().enumerate() {
        pairs_tried += 1;

        if let Err(e) = check_pair(candidates, source_field, dest_field, existing) {
            warn!("Skipping lookup pair '{source_field}' -> '{dest_field}': {e}");
            pairs_failed += 1;
            first_error.get_or_insert(e);
            continue;
        }

        let new_records: Vec<SourceRecord> = candidates
            .iter()
            .filter(|record| {
                // check_pair guarantees the value is present and non-null.
                record
                    .lookup_value(source_field)
                    .map(|v| !existing.contains(dest_field, &v))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        if !new_records.is_empty() {
            debug!(
                "{} of {} candidate(s) are new under lookup field '{dest_field}'",
                new_records.len(),
                candidates.len()
            );
            return Ok(Resolution {
                new_records,
                matched_pair: Some(index),
            });
        }
    }

    if pairs_tried > 0 && pairs_failed == pairs_tried {
        if let Some(e) = first_error {
            return Err(e);
        }
    }

    Ok(Resolution {
        new_records: Vec::new(),
        matched_pair: None,
    })
}

fn check_pair(
    candidates: &[SourceRecord],
    source_field: &str,
    dest_field: &str,
    existing: &ExistingKeySet,
) -> Result<(), ResolutionError> {
    for record in candidates {
        match record.get(source_field) {
            None => {
                return Err(ResolutionError::MissingSourceField(
                    source_field.to_string(),
                ))
            }
            Some(serde_json::Value::Null) => {
                return Err(ResolutionError::NullSourceField(source_field.to_string()))
            }
            Some(_) => {}
        }
    }
    if existing.column_has_nulls(dest_field) {
        return Err(ResolutionError::NullDestinationField(
            dest_field.to_string(),
        ));
    }
    Ok(())
}
