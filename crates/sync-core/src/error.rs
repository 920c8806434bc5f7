//! Error types for the sync core.

use thiserror::Error;

/// Errors detected when validating a column mapping.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MappingError {
    /// Lookup field lists must pair up one-to-one
    #[error("lookup field lists differ in length: {source_len} source field(s) vs {dest_len} destination field(s)")]
    LookupLengthMismatch { source_len: usize, dest_len: usize },

    /// At least one lookup pair is required for existence checks
    #[error("no lookup fields configured")]
    NoLookupFields,

    /// A lookup source field must be part of the column mapping
    #[error("lookup source field '{0}' is not in the column mapping")]
    UnmappedLookupField(String),

    /// The foreign-key field must be produced by the column mapping
    #[error("foreign-key field '{0}' is not a destination column of the mapping")]
    UnmappedForeignKey(String),

    /// Destination column named twice
    #[error("destination column '{0}' appears more than once in the mapping")]
    DuplicateDestination(String),
}

/// Errors raised while resolving which candidate records are new.
///
/// These are data-integrity preconditions on the lookup fields, not
/// recoverable per-record states.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolutionError {
    /// A candidate record does not carry the source lookup field at all
    #[error("source field '{0}' is missing from the data")]
    MissingSourceField(String),

    /// A candidate record carries a null in the source lookup field
    #[error("source field '{0}' contains null values")]
    NullSourceField(String),

    /// The destination lookup column contains nulls
    #[error("destination field '{0}' contains null values")]
    NullDestinationField(String),
}
