//! Core types and algorithms for school-sync.
//!
//! This crate provides the foundational pieces of the sync pipeline,
//! including:
//!
//! - [`SourceRecord`] / [`DestinationRow`] - the record model on both sides
//! - [`ColumnMapping`] - source-to-destination column renames and lookup fields
//! - [`Paginator`] - bounded page retrieval with two cursor-advance modes
//! - [`resolve_new`] - existence resolution against the destination
//! - [`normalize`] - rename, serialize, and id-assign records for insertion
//!
//! # Architecture
//!
//! Everything in this crate is free of network and database I/O. The two
//! external collaborators are injected through traits:
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── school-sync-giga-source    (implements Source over HTTP)
//!    ├─── school-sync-postgres-store (implements Store over PostgreSQL)
//!    └─── school-sync               (drives the pipeline, implements Confirm)
//! ```

pub mod confirm;
pub mod error;
pub mod mapping;
pub mod normalize;
pub mod paginate;
pub mod record;
pub mod resolve;
pub mod source;
pub mod store;
pub mod validate;

// Re-exports for convenience
pub use confirm::Confirm;
pub use error::{MappingError, ResolutionError};
pub use mapping::{ColumnMapping, ColumnRename};
pub use normalize::normalize;
pub use paginate::{PageCursor, PaginationMode, Paginator};
pub use record::{DestinationRow, SourceRecord};
pub use resolve::{resolve_new, ExistingKeySet, Resolution};
pub use source::Source;
pub use store::Store;
pub use validate::partition;
