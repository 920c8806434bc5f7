//! Giga school-master HTTP source for school-sync
//!
//! This crate implements the `Source` capability over the school-master API:
//! a bearer-token authenticated endpoint returning `{ "data": [ ... ] }`,
//! paginated through two configurable query parameters.

mod source;

pub use source::{GigaSource, SourceOpts};
