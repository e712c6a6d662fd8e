//! Application state with a shared `ListManager` for concurrent access.
//!
//! [`AppState`] wraps the manager in `Arc<tokio::sync::Mutex<>>` for use
//! with axum handlers. `SqliteStore` holds a `rusqlite::Connection`, which
//! is `!Sync`, so the manager cannot sit behind an `RwLock`. List-level
//! exclusion is the job of the lock-free [`LockManager`], whose probes
//! never wait on the mutex.

use std::sync::Arc;

use listman_storage::{InMemoryStore, ListStore, SqliteStore};

use crate::concurrency::LockManager;
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::index::{IndexNotifier, NoopIndexNotifier};
use crate::manager::ListManager;
use crate::middleware::{ForgeryTokenValidator, SharedSecretValidator};

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// The list manager (async Mutex, non-blocking await).
    pub manager: Arc<tokio::sync::Mutex<ListManager>>,
    /// Per-list lock manager, shared with the manager.
    pub lock_manager: Arc<LockManager>,
    /// Anti-forgery check for mutating requests.
    pub forgery: Arc<dyn ForgeryTokenValidator>,
}

impl AppState {
    /// Builds state over an arbitrary store and starts the lock expiry sweep.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: &ServerConfig,
        store: Box<dyn ListStore>,
        indexer: Arc<dyn IndexNotifier>,
    ) -> Self {
        let lock_manager = Arc::new(LockManager::new(config.lock_ttl));
        lock_manager.start_expiry_sweep(config.lock_sweep_interval);

        let manager = ListManager::new(store, Arc::clone(&lock_manager), indexer);
        AppState {
            manager: Arc::new(tokio::sync::Mutex::new(manager)),
            lock_manager,
            forgery: Arc::new(SharedSecretValidator::new(config.forgery_token.clone())),
        }
    }

    /// Opens the SQLite database named in `config`.
    pub fn open(config: &ServerConfig, indexer: Arc<dyn IndexNotifier>) -> Result<Self, ApiError> {
        let store = SqliteStore::new(&config.db_path)
            .map_err(|e| ApiError::InternalError(format!("failed to open store: {}", e)))?;
        Ok(Self::new(config, Box::new(store), indexer))
    }

    /// State over an empty in-memory store (for testing).
    pub fn in_memory(config: &ServerConfig) -> Self {
        Self::new(
            config,
            Box::new(InMemoryStore::new()),
            Arc::new(NoopIndexNotifier),
        )
    }

    /// Replaces the forgery token validator.
    pub fn with_forgery_validator(mut self, validator: Arc<dyn ForgeryTokenValidator>) -> Self {
        self.forgery = validator;
        self
    }
}
