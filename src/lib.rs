//! # Idcache - Durable file-identifier cache
//!
//! Persists a mapping between caller-supplied content keys (a hash of the
//! source bytes, a source URL, a slug) and file identifiers previously
//! handed back by an external resolution system, so identifiers can be
//! reused instead of re-uploading or re-fetching the content.
//!
//! Idcache provides:
//! - SQLite-backed storage with one table: `file_ids(key, file_id, created_at)`
//! - Last-write-wins `put` with atomic per-row commit
//! - `get` that returns a complete entry or nothing, never an error for a
//!   missing key
//! - Explicit open/close lifecycle suited to a single-process host

pub mod config;
pub mod storage;

// Re-exports for convenient access
pub use storage::{CacheEntry, FileIdStore};

/// Result type alias for Idcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Idcache operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Backing file unreachable, unwritable, or the existing table shape is
    /// incompatible. Fatal at startup: the host refuses to run with an
    /// unreliable cache rather than reinitialize silently.
    #[error("Storage init failed at {path}: {source}")]
    StorageInit {
        path: std::path::PathBuf,
        source: rusqlite::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
