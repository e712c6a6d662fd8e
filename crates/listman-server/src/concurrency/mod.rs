//! List-level concurrency control.
//!
//! - [`lock_manager::LockManager`] for exclusive per-list locks with TTL
//!   expiry and in-use tracking

pub mod lock_manager;

pub use lock_manager::{
    InUseGuard, LockError, LockGrant, LockInfo, LockManager, LockStatusEntry, LockToken,
    MAX_LOCK_TTL,
};
