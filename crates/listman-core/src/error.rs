//! Core error types for listman-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! domain failure modes: missing entities, name conflicts, and rejected input.

use thiserror::Error;

use crate::id::{ContactId, FolderId, ListId};
use crate::validation::FieldError;

/// Core errors produced by the listman-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A contact list was not found.
    #[error("list not found: {id}")]
    ListNotFound { id: ListId },

    /// A folder was not found.
    #[error("folder not found: {id}")]
    FolderNotFound { id: FolderId },

    /// A contact was not found.
    #[error("contact not found: {id}")]
    ContactNotFound { id: ContactId },

    /// Another item in the same folder already uses the name.
    #[error("an item named '{name}' already exists in this folder")]
    NameConflict { name: String },

    /// A folder or list name failed the naming policy.
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Malformed ID or otherwise unusable request input.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Payload validation failed; carries every field error found.
    #[error("validation failed: {} field error(s)", .0.len())]
    ValidationFailed(Vec<FieldError>),
}
