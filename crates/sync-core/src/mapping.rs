//! Static column mapping between source fields and destination columns.

use crate::error::MappingError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One source-field to destination-column rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub source: String,
    pub destination: String,
}

/// The ordered source-to-destination column mapping, the lookup field pairs
/// used for existence comparison, and the destination-side foreign-key field.
///
/// The i-th source lookup field is compared against the i-th destination
/// lookup field; [`ColumnMapping::validate`] enforces that the two lists pair
/// up and that every named field is actually produced by the mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Renames in destination column order
    pub columns: Vec<ColumnRename>,

    /// Source-side lookup fields, in tie-break order
    pub lookup_source_fields: Vec<String>,

    /// Destination-side lookup columns, parallel to `lookup_source_fields`
    pub lookup_dest_fields: Vec<String>,

    /// Destination column that must reference a valid country code
    pub foreign_key_field: String,
}

impl ColumnMapping {
    /// Check the structural invariants once, before a run starts.
    pub fn validate(&self) -> Result<(), MappingError> {
        if self.lookup_source_fields.len() != self.lookup_dest_fields.len() {
            return Err(MappingError::LookupLengthMismatch {
                source_len: self.lookup_source_fields.len(),
                dest_len: self.lookup_dest_fields.len(),
            });
        }
        if self.lookup_source_fields.is_empty() {
            return Err(MappingError::NoLookupFields);
        }

        let mut seen = HashSet::new();
        for rename in &self.columns {
            if !seen.insert(rename.destination.as_str()) {
                return Err(MappingError::DuplicateDestination(
                    rename.destination.clone(),
                ));
            }
        }

        for field in &self.lookup_source_fields {
            if !self.columns.iter().any(|r| &r.source == field) {
                return Err(MappingError::UnmappedLookupField(field.clone()));
            }
        }

        if self.fk_source_field().is_none() {
            return Err(MappingError::UnmappedForeignKey(
                self.foreign_key_field.clone(),
            ));
        }

        Ok(())
    }

    /// All renames, in destination column order.
    pub fn renames(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|r| (r.source.as_str(), r.destination.as_str()))
    }

    /// Lookup pairs `(source_field, destination_field)` in tie-break order.
    pub fn lookup_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lookup_source_fields
            .iter()
            .map(String::as_str)
            .zip(self.lookup_dest_fields.iter().map(String::as_str))
    }

    /// The lookup pair at `index`. Panics if out of range; callers only pass
    /// indices returned by the resolver.
    pub fn lookup_pair(&self, index: usize) -> (&str, &str) {
        (
            self.lookup_source_fields[index].as_str(),
            self.lookup_dest_fields[index].as_str(),
        )
    }

    /// The source-side name of the foreign-key field, if the mapping
    /// produces it. Guaranteed `Some` after a successful [`validate`].
    ///
    /// [`validate`]: ColumnMapping::validate
    pub fn fk_source_field(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|r| r.destination == self.foreign_key_field)
            .map(|r| r.source.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rename(source: &str, destination: &str) -> ColumnRename {
        ColumnRename {
            source: source.to_string(),
            destination: destination.to_string(),
        }
    }

    fn school_mapping() -> ColumnMapping {
        ColumnMapping {
            columns: vec![
                rename("school_id", "external_id"),
                rename("school_name", "name"),
                rename("giga_id_school", "giga_id_school"),
                rename("country_code", "country_code"),
            ],
            lookup_source_fields: vec!["giga_id_school".to_string()],
            lookup_dest_fields: vec!["giga_id_school".to_string()],
            foreign_key_field: "country_code".to_string(),
        }
    }

    #[test]
    fn test_valid_mapping() {
        assert_eq!(school_mapping().validate(), Ok(()));
    }

    #[test]
    fn test_lookup_length_mismatch() {
        let mut mapping = school_mapping();
        mapping.lookup_dest_fields.push("external_id".to_string());
        assert_eq!(
            mapping.validate(),
            Err(MappingError::LookupLengthMismatch { source_len: 1, dest_len: 2 })
        );
    }

    #[test]
    fn test_empty_lookup_rejected() {
        let mut mapping = school_mapping();
        mapping.lookup_source_fields.clear();
        mapping.lookup_dest_fields.clear();
        assert_eq!(mapping.validate(), Err(MappingError::NoLookupFields));
    }

    #[test]
    fn test_unmapped_lookup_field() {
        let mut mapping = school_mapping();
        mapping.lookup_source_fields = vec!["code".to_string()];
        mapping.lookup_dest_fields = vec!["code".to_string()];
        assert_eq!(
            mapping.validate(),
            Err(MappingError::UnmappedLookupField("code".to_string()))
        );
    }

    #[test]
    fn test_unmapped_foreign_key() {
        let mut mapping = school_mapping();
        mapping.foreign_key_field = "region_code".to_string();
        assert_eq!(
            mapping.validate(),
            Err(MappingError::UnmappedForeignKey("region_code".to_string()))
        );
    }

    #[test]
    fn test_duplicate_destination() {
        let mut mapping = school_mapping();
        mapping.columns.push(rename("other", "name"));
        assert_eq!(
            mapping.validate(),
            Err(MappingError::DuplicateDestination("name".to_string()))
        );
    }

    #[test]
    fn test_fk_source_field() {
        let mapping = school_mapping();
        assert_eq!(mapping.fk_source_field(), Some("country_code"));
    }
}
