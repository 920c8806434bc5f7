//! school-sync
//!
//! Incremental synchronization of school records from the Giga school-master
//! API into a Project Connect PostgreSQL database. The pipeline fetches
//! records (in one request or page by page), drops records without a country
//! code, resolves which records are genuinely new against the destination's
//! lookup columns, renames columns per the configured mapping, and inserts
//! the new rows with sequentially assigned ids.
//!
//! The algorithms live in the `sync-core` crate; the HTTP source and the
//! PostgreSQL store are separate crates wired together here.

pub mod config;
pub mod sync;
pub mod testing;

pub use config::{SourceConfig, SyncConfig};
pub use sync::{AssumeYes, StdinConfirm, SyncDriver, SyncReport};
