//! ListManager: the single coordinator between HTTP handlers, the store,
//! the lock manager, and the search index.
//!
//! All business logic flows through [`ListManager`]; handlers are thin
//! wrappers that delegate to these methods. The operations are split by
//! concern:
//!
//! - [`repository`]: list and folder lifecycle (create, convert, move,
//!   rename, delete, browse)
//! - [`associations`]: contact association, removal, deduplication
//! - [`export`]: CSV export of a list's contacts

pub mod associations;
pub mod export;
pub mod repository;

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use uuid::Uuid;

use listman_core::{validation, CoreError, FolderId, ListId};
use listman_storage::ListStore;

use crate::concurrency::LockManager;
use crate::error::ApiError;
use crate::index::{IndexEvent, IndexNotifier};

pub use export::ContactExport;
pub use repository::{FolderContents, FolderRemoval};

/// Folders and lists below (and including) a folder.
#[derive(Debug, Default)]
pub(crate) struct Subtree {
    /// Folder IDs in breadth-first order, the root first.
    pub folders: Vec<FolderId>,
    pub lists: Vec<ListId>,
}

/// The central service for folder, list, and contact association operations.
///
/// Holds the storage backend plus shared handles on the lock manager and the
/// index notifier. Every mutation of a list probes the lock manager first and
/// fails fast when the list is locked or in use.
pub struct ListManager {
    store: Box<dyn ListStore>,
    locks: Arc<LockManager>,
    indexer: Arc<dyn IndexNotifier>,
}

impl ListManager {
    pub fn new(
        store: Box<dyn ListStore>,
        locks: Arc<LockManager>,
        indexer: Arc<dyn IndexNotifier>,
    ) -> Self {
        ListManager {
            store,
            locks,
            indexer,
        }
    }

    /// The lock manager this service probes.
    pub fn lock_manager(&self) -> &Arc<LockManager> {
        &self.locks
    }

    fn notify(&self, event: IndexEvent) {
        self.indexer.notify(event);
    }

    /// Fails with `NameConflict` if a sibling folder or list inside `parent`
    /// already uses `name` (case-insensitive). `except` is the item being
    /// renamed or moved, which never conflicts with itself.
    fn ensure_unique_name(
        &self,
        parent: Option<FolderId>,
        name: &str,
        except: Option<Uuid>,
    ) -> Result<(), ApiError> {
        let folder_clash = self
            .store
            .child_folders(parent)?
            .into_iter()
            .any(|f| Some(f.id.0) != except && validation::same_name(&f.name, name));
        let list_clash = self
            .store
            .lists_in_folder(parent)?
            .into_iter()
            .any(|l| Some(l.id.0) != except && validation::same_name(&l.name, name));

        if folder_clash || list_clash {
            tracing::debug!(?parent, name, "name conflict");
            return Err(CoreError::NameConflict {
                name: name.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Fails with `FolderNotFound` unless `folder` is the root or exists.
    fn ensure_folder_exists(&self, folder: Option<FolderId>) -> Result<(), ApiError> {
        if let Some(id) = folder {
            if self.store.find_folder(id)?.is_none() {
                return Err(CoreError::FolderNotFound { id }.into());
            }
        }
        Ok(())
    }

    /// Walks the folder tree below `root`.
    fn collect_subtree(&self, root: FolderId) -> Result<Subtree, ApiError> {
        let mut subtree = Subtree::default();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([root]);

        while let Some(folder) = queue.pop_front() {
            if !seen.insert(folder) {
                continue;
            }
            subtree.folders.push(folder);
            subtree.lists.extend(
                self.store
                    .lists_in_folder(Some(folder))?
                    .into_iter()
                    .map(|l| l.id),
            );
            queue.extend(
                self.store
                    .child_folders(Some(folder))?
                    .into_iter()
                    .map(|f| f.id),
            );
        }
        Ok(subtree)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use listman_core::{ContactPayload, ListKind};
    use listman_storage::InMemoryStore;

    use crate::index::ChannelIndexNotifier;

    pub fn manager() -> ListManager {
        ListManager::new(
            Box::new(InMemoryStore::new()),
            Arc::new(LockManager::with_default_ttl()),
            Arc::new(crate::index::NoopIndexNotifier),
        )
    }

    pub fn manager_with_events() -> (
        ListManager,
        tokio::sync::mpsc::UnboundedReceiver<IndexEvent>,
    ) {
        let (notifier, rx) = ChannelIndexNotifier::new();
        let manager = ListManager::new(
            Box::new(InMemoryStore::new()),
            Arc::new(LockManager::with_default_ttl()),
            Arc::new(notifier),
        );
        (manager, rx)
    }

    pub fn payload(identifier: &str) -> ContactPayload {
        ContactPayload {
            contact_id: None,
            identifier: Some(identifier.to_string()),
            preferred_email: Some(format!("{identifier}@example.com")),
            first_name: Some("Ada".to_string()),
            surname: Some("Lovelace".to_string()),
        }
    }

    pub fn static_list(manager: &mut ListManager, name: &str) -> ListId {
        manager
            .create_list(name, None, ListKind::Static, None)
            .unwrap()
            .id
    }
}
