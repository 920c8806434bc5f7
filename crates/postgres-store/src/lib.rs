//! PostgreSQL destination store for school-sync
//!
//! Implements the `Store` capability over a single destination table:
//! lookup-column reads, the next-available-id query, and batched inserts.

mod store;

pub use store::{PostgresStore, StoreOpts};
