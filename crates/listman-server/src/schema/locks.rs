//! Schema types for lock management endpoints.

use serde::Serialize;

use crate::concurrency::{LockStatusEntry, LockToken};

/// Response showing all active list locks.
#[derive(Debug, Clone, Serialize)]
pub struct LockStatusResponse {
    pub locks: Vec<LockStatusEntry>,
}

/// Response after an administrator unlock.
#[derive(Debug, Clone, Serialize)]
pub struct UnlockResponse {
    /// The token that was revoked, if the list was locked.
    pub released: Option<LockToken>,
}
