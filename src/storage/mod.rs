//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with a single table:
//! - file_ids(key, file_id, created_at)
//!
//! `key` is the primary key; a row is the latest known-good identifier for
//! that key, not a history.

pub mod schema;
pub mod sqlite;

pub use sqlite::{CacheEntry, FileIdStore, StoreStats};
