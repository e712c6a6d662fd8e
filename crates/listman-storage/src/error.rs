//! Storage error types for listman-storage.
//!
//! [`StorageError`] covers the failure modes of the storage layer: backend
//! errors, serialization, entity-not-found variants, and integrity violations.

use listman_core::{ContactId, FolderId, ListId};
use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The SQLite backend reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A list with the given ID was not found.
    #[error("list not found: {0}")]
    ListNotFound(ListId),

    /// A folder with the given ID was not found.
    #[error("folder not found: {0}")]
    FolderNotFound(FolderId),

    /// A contact with the given ID was not found.
    #[error("contact not found: {0}")]
    ContactNotFound(ContactId),

    /// A data integrity violation was detected.
    #[error("integrity error: {reason}")]
    IntegrityError { reason: String },
}
