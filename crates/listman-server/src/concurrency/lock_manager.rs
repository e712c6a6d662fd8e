//! Per-list exclusive lock manager.
//!
//! [`LockManager`] hands out one lock per contact list with TTL-based
//! auto-expiry, and separately tracks an "in use" counter for background
//! processing that reads a list without locking it. Every mutating list
//! operation probes both via [`LockManager::ensure_available`] and fails
//! fast; nothing here ever blocks waiting for a lock.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use listman_core::ListId;

/// Longest lock lifetime a manager will grant; longer TTLs are clamped.
pub const MAX_LOCK_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Token proving ownership of a list lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockToken(pub Uuid);

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LockToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(LockToken)
    }
}

/// An active lock on a list.
#[derive(Debug, Clone)]
pub struct LockInfo {
    pub token: LockToken,
    pub list_id: ListId,
    /// Who took the lock, when known.
    pub owner: Option<String>,
    pub acquired_at: Instant,
    pub expires_at: Instant,
}

impl LockInfo {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// A successful lock acquisition.
#[derive(Debug, Clone, Serialize)]
pub struct LockGrant {
    pub token: LockToken,
    pub list_id: ListId,
    pub expires_at: String,
}

/// Errors from lock operations.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// The list already holds an unexpired lock.
    #[error("list {list_id} is locked")]
    AlreadyLocked {
        list_id: ListId,
        owner: Option<String>,
    },

    /// The list is being processed in the background.
    #[error("list {list_id} is in use")]
    InUse { list_id: ListId },

    /// One or more lists inside a folder are locked or in use.
    #[error("{} list(s) are locked or in use", .lists.len())]
    Busy { lists: Vec<ListId> },
}

/// Status entry for a single list lock.
#[derive(Debug, Clone, Serialize)]
pub struct LockStatusEntry {
    pub list_id: ListId,
    pub token: LockToken,
    pub owner: Option<String>,
    pub expires_at: String,
}

/// Marks a list as in use until dropped.
pub struct InUseGuard<'a> {
    manager: &'a LockManager,
    list_id: ListId,
}

impl Drop for InUseGuard<'_> {
    fn drop(&mut self) {
        self.manager.leave_in_use(self.list_id);
    }
}

/// Per-list lock manager with TTL-based auto-expiry.
///
/// Uses `DashMap` for concurrent access; acquisition goes through the map's
/// entry API so two racing acquires on the same list cannot both succeed.
pub struct LockManager {
    locks: DashMap<ListId, LockInfo>,
    in_use: DashMap<ListId, usize>,
    ttl: Duration,
}

impl LockManager {
    /// Creates a new lock manager with the given lock TTL, clamped to
    /// [`MAX_LOCK_TTL`].
    pub fn new(ttl: Duration) -> Self {
        if ttl > MAX_LOCK_TTL {
            tracing::warn!(?ttl, max = ?MAX_LOCK_TTL, "lock TTL clamped");
        }
        LockManager {
            locks: DashMap::new(),
            in_use: DashMap::new(),
            ttl: ttl.min(MAX_LOCK_TTL),
        }
    }

    /// Creates a lock manager with the default 30-minute TTL.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(30 * 60))
    }

    /// Formats an `Instant` as an RFC 3339 timestamp.
    fn format_expiry(expires_at: Instant) -> String {
        let now = Instant::now();
        if expires_at > now {
            let remaining = chrono::Duration::from_std(expires_at.duration_since(now))
                .unwrap_or_else(|_| chrono::Duration::zero());
            let now = chrono::Utc::now();
            now.checked_add_signed(remaining).unwrap_or(now).to_rfc3339()
        } else {
            "expired".to_string()
        }
    }

    /// Tries to take the exclusive lock on a list.
    ///
    /// Fails if the list holds an unexpired lock or is in use. An expired
    /// lock is silently replaced.
    pub fn acquire(&self, list_id: ListId, owner: Option<String>) -> Result<LockGrant, LockError> {
        let now = Instant::now();

        // Held across the in-use probe so the check and insert are atomic
        // with respect to other acquires on this list.
        let entry = self.locks.entry(list_id);
        if let Entry::Occupied(existing) = &entry {
            if !existing.get().is_expired(now) {
                return Err(LockError::AlreadyLocked {
                    list_id,
                    owner: existing.get().owner.clone(),
                });
            }
        }
        if self.is_in_use(list_id) {
            return Err(LockError::InUse { list_id });
        }

        let info = LockInfo {
            token: LockToken(Uuid::new_v4()),
            list_id,
            owner,
            acquired_at: now,
            expires_at: now.checked_add(self.ttl).unwrap_or(now),
        };
        let grant = LockGrant {
            token: info.token,
            list_id,
            expires_at: Self::format_expiry(info.expires_at),
        };
        entry.insert(info);

        tracing::info!(%list_id, token = %grant.token, "list locked");
        Ok(grant)
    }

    /// Releases the lock identified by `token`.
    ///
    /// Releasing an unknown or already expired token is a no-op.
    pub fn release(&self, token: LockToken) -> Result<(), LockError> {
        let list_id = self
            .locks
            .iter()
            .find(|entry| entry.value().token == token)
            .map(|entry| *entry.key());

        match list_id {
            Some(list_id) => {
                if self
                    .locks
                    .remove_if(&list_id, |_, info| info.token == token)
                    .is_some()
                {
                    tracing::info!(%list_id, %token, "list lock released");
                }
            }
            None => tracing::debug!(%token, "release of unknown lock token ignored"),
        }
        Ok(())
    }

    /// Force-releases whatever lock `list_id` holds, returning its token.
    pub fn unlock(&self, list_id: ListId) -> Option<LockToken> {
        let removed = self.locks.remove(&list_id).map(|(_, info)| info.token);
        if let Some(token) = removed {
            tracing::info!(%list_id, %token, "list force-unlocked");
        }
        removed
    }

    /// The current unexpired lock on a list, if any.
    pub fn lock_of(&self, list_id: ListId) -> Option<LockInfo> {
        let now = Instant::now();
        self.locks
            .get(&list_id)
            .filter(|entry| !entry.value().is_expired(now))
            .map(|entry| entry.value().clone())
    }

    /// Non-blocking probe: does the list hold an unexpired lock?
    pub fn is_locked(&self, list_id: ListId) -> bool {
        self.lock_of(list_id).is_some()
    }

    /// Non-blocking probe: is background processing running against the list?
    pub fn is_in_use(&self, list_id: ListId) -> bool {
        self.in_use
            .get(&list_id)
            .map(|count| *count > 0)
            .unwrap_or(false)
    }

    /// Marks a list as in use for the lifetime of the returned guard.
    pub fn mark_in_use(&self, list_id: ListId) -> InUseGuard<'_> {
        *self.in_use.entry(list_id).or_insert(0) += 1;
        InUseGuard {
            manager: self,
            list_id,
        }
    }

    fn leave_in_use(&self, list_id: ListId) {
        if let Entry::Occupied(mut entry) = self.in_use.entry(list_id) {
            if *entry.get() <= 1 {
                entry.remove();
            } else {
                *entry.get_mut() -= 1;
            }
        }
    }

    /// Fails if the list is locked or in use.
    pub fn ensure_available(&self, list_id: ListId) -> Result<(), LockError> {
        if let Some(info) = self.lock_of(list_id) {
            return Err(LockError::AlreadyLocked {
                list_id,
                owner: info.owner,
            });
        }
        if self.is_in_use(list_id) {
            return Err(LockError::InUse { list_id });
        }
        Ok(())
    }

    /// Fails with every busy list reported if any of `lists` is locked or in use.
    pub fn ensure_all_available(&self, lists: &[ListId]) -> Result<(), LockError> {
        let busy: Vec<ListId> = lists
            .iter()
            .copied()
            .filter(|id| self.ensure_available(*id).is_err())
            .collect();
        if busy.is_empty() {
            Ok(())
        } else {
            Err(LockError::Busy { lists: busy })
        }
    }

    /// Returns all unexpired locks.
    pub fn status(&self) -> Vec<LockStatusEntry> {
        let now = Instant::now();
        self.locks
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .map(|entry| {
                let info = entry.value();
                LockStatusEntry {
                    list_id: info.list_id,
                    token: info.token,
                    owner: info.owner.clone(),
                    expires_at: Self::format_expiry(info.expires_at),
                }
            })
            .collect()
    }

    /// Removes expired locks and returns the lists they guarded.
    pub fn sweep_expired(&self) -> Vec<ListId> {
        let now = Instant::now();
        let mut released = Vec::new();
        self.locks.retain(|list_id, info| {
            let expired = info.is_expired(now);
            if expired {
                released.push(*list_id);
            }
            !expired
        });
        released
    }

    /// Spawns a background tokio task that periodically sweeps expired locks.
    pub fn start_expiry_sweep(self: &Arc<Self>, interval: Duration) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            loop {
                tick.tick().await;
                let released = manager.sweep_expired();
                if !released.is_empty() {
                    tracing::info!("Swept {} expired lock(s): {:?}", released.len(), released);
                }
            }
        });
    }
}
