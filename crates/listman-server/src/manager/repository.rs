//! List and folder lifecycle: create, convert, move, rename, delete, browse.

use std::sync::Arc;

use serde::Serialize;

use listman_core::{validation, ContactList, CoreError, Folder, FolderId, ListId, ListKind};

use crate::error::ApiError;
use crate::index::IndexEvent;
use crate::messages;

use super::ListManager;

/// Direct children of a folder.
#[derive(Debug, Clone, Serialize)]
pub struct FolderContents {
    /// The browsed folder; `None` for the root.
    pub folder: Option<Folder>,
    pub folders: Vec<Folder>,
    pub lists: Vec<ContactList>,
}

/// Everything removed by a cascading folder delete.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderRemoval {
    pub folders: Vec<FolderId>,
    pub lists: Vec<ListId>,
}

fn list_name(raw: &str) -> Result<String, ApiError> {
    validation::validate_name(raw).map_err(|err| invalid_name(err, messages::INVALID_LIST_NAME))
}

fn folder_name(raw: &str) -> Result<String, ApiError> {
    validation::validate_name(raw).map_err(|err| invalid_name(err, messages::INVALID_FOLDER_NAME))
}

const CONVERTED_SUFFIX: &str = " (converted)";

/// Name of a converted copy; the source name is cut so the result stays
/// within [`validation::NAME_MAX_LENGTH`].
fn converted_name(source: &str) -> String {
    let room = validation::NAME_MAX_LENGTH - CONVERTED_SUFFIX.chars().count();
    let base: String = source.chars().take(room).collect();
    format!("{}{}", base.trim_end(), CONVERTED_SUFFIX)
}

fn invalid_name(err: CoreError, message: &str) -> ApiError {
    match err {
        CoreError::InvalidName { reason, .. } => ApiError::InvalidName {
            message: message.to_string(),
            reason,
        },
        other => other.into(),
    }
}

impl ListManager {
    // -------------------------------------------------------------------
    // Lists
    // -------------------------------------------------------------------

    /// Looks up a list by ID.
    pub fn find_by_id(&self, id: ListId) -> Result<Option<ContactList>, ApiError> {
        Ok(self.store.find_list(id)?)
    }

    /// Like [`find_by_id`](Self::find_by_id) but missing is `NotFound`.
    pub fn get_list(&self, id: ListId) -> Result<ContactList, ApiError> {
        self.find_by_id(id)?
            .ok_or_else(|| CoreError::ListNotFound { id }.into())
    }

    /// Creates an empty list inside `folder` (`None` = root).
    ///
    /// Only segmented lists carry a segmentation query.
    pub fn create_list(
        &mut self,
        name: &str,
        folder: Option<FolderId>,
        kind: ListKind,
        query: Option<String>,
    ) -> Result<ContactList, ApiError> {
        let name = list_name(name)?;
        if kind == ListKind::Static && query.is_some() {
            return Err(CoreError::InvalidInput {
                reason: "only segmented lists take a query".to_string(),
            }
            .into());
        }
        self.ensure_folder_exists(folder)?;
        self.ensure_unique_name(folder, &name, None)?;

        let mut list = ContactList::new(name, folder, kind);
        list.source.query = query;
        self.store.insert_list(&list)?;

        tracing::info!(list_id = %list.id, name = %list.name, kind = ?list.kind, "list created");
        self.notify(IndexEvent::ListChanged(list.id));
        Ok(list)
    }

    /// Snapshots a segmented list into a new static list.
    ///
    /// The copy is named `"<name> (converted)"`, lives in the source's
    /// folder, holds the source's current contacts, and records the source
    /// in its include list. The source is marked in use while it is read.
    pub fn convert(&mut self, source_id: ListId) -> Result<ListId, ApiError> {
        let source = self.get_list(source_id)?;
        if source.kind != ListKind::Segmented {
            return Err(CoreError::InvalidInput {
                reason: format!("list {} is not a segmented list", source_id),
            }
            .into());
        }

        let locks = Arc::clone(&self.locks);
        let _in_use = locks.mark_in_use(source_id);

        let name = converted_name(&source.name);
        self.ensure_unique_name(source.folder, &name, None)?;

        let mut converted = ContactList::new(name, source.folder, ListKind::Static);
        converted.source.include.push(source_id);
        let contacts: Vec<_> = self.get_contacts(source_id)?.map(|c| c.id).collect();
        self.store
            .insert_list_with_associations(&converted, &contacts)?;

        tracing::info!(
            %source_id,
            list_id = %converted.id,
            contacts = contacts.len(),
            "segmented list converted"
        );
        self.notify(IndexEvent::ListChanged(converted.id));
        Ok(converted.id)
    }

    /// Deletes a list and its associations; contacts are kept.
    ///
    /// Returns `false` when the list did not exist, which is not an error.
    pub fn delete(&mut self, id: ListId) -> Result<bool, ApiError> {
        if self.store.find_list(id)?.is_none() {
            tracing::debug!(list_id = %id, "delete of missing list ignored");
            return Ok(false);
        }
        self.locks.ensure_available(id).inspect_err(|_| {
            tracing::warn!(list_id = %id, "delete rejected: list busy");
        })?;

        let deleted = self.store.delete_list(id)?;
        if deleted {
            tracing::info!(list_id = %id, "list deleted");
            self.notify(IndexEvent::ListRemoved(id));
        }
        Ok(deleted)
    }

    /// Moves a list into `destination` (`None` = root).
    pub fn move_list(
        &mut self,
        id: ListId,
        destination: Option<FolderId>,
    ) -> Result<ContactList, ApiError> {
        let mut list = self.get_list(id)?;
        self.locks.ensure_available(id)?;
        self.ensure_folder_exists(destination)?;
        if list.folder == destination {
            return Ok(list);
        }
        self.ensure_unique_name(destination, &list.name, Some(id.0))?;

        list.folder = destination;
        self.store.update_list(&list)?;

        tracing::info!(list_id = %id, ?destination, "list moved");
        self.notify(IndexEvent::ListChanged(id));
        Ok(list)
    }

    // -------------------------------------------------------------------
    // Folders
    // -------------------------------------------------------------------

    /// Creates a folder under `parent` (`None` = root).
    pub fn create_folder(
        &mut self,
        name: &str,
        parent: Option<FolderId>,
    ) -> Result<Folder, ApiError> {
        let name = folder_name(name)?;
        self.ensure_folder_exists(parent)?;
        self.ensure_unique_name(parent, &name, None)?;

        let folder = Folder::new(name, parent);
        self.store.insert_folder(&folder)?;

        tracing::info!(folder_id = %folder.id, name = %folder.name, "folder created");
        Ok(folder)
    }

    /// Renames a folder. Fails if any list below it is busy.
    pub fn rename_folder(&mut self, id: FolderId, new_name: &str) -> Result<Folder, ApiError> {
        let name = folder_name(new_name)?;
        let mut folder = self.store.get_folder(id)?;

        let subtree = self.collect_subtree(id)?;
        self.locks.ensure_all_available(&subtree.lists)?;
        self.ensure_unique_name(folder.parent, &name, Some(id.0))?;

        folder.name = name;
        self.store.update_folder(&folder)?;

        tracing::info!(folder_id = %id, name = %folder.name, "folder renamed");
        Ok(folder)
    }

    /// Moves a folder under `destination` (`None` = root).
    ///
    /// Moving a folder into itself or one of its descendants is rejected.
    pub fn move_folder(
        &mut self,
        id: FolderId,
        destination: Option<FolderId>,
    ) -> Result<Folder, ApiError> {
        let mut folder = self.store.get_folder(id)?;
        let subtree = self.collect_subtree(id)?;

        if let Some(dest) = destination {
            if subtree.folders.contains(&dest) {
                return Err(CoreError::InvalidInput {
                    reason: format!("folder {} cannot be moved into itself or a descendant", id),
                }
                .into());
            }
        }
        self.ensure_folder_exists(destination)?;
        self.locks.ensure_all_available(&subtree.lists)?;
        if folder.parent == destination {
            return Ok(folder);
        }
        self.ensure_unique_name(destination, &folder.name, Some(id.0))?;

        folder.parent = destination;
        self.store.update_folder(&folder)?;

        tracing::info!(folder_id = %id, ?destination, "folder moved");
        Ok(folder)
    }

    /// Deletes a folder with every folder and list below it.
    ///
    /// Nothing is deleted if any contained list is locked or in use; the
    /// error names every busy list.
    pub fn delete_folder(&mut self, id: FolderId) -> Result<FolderRemoval, ApiError> {
        self.store.get_folder(id)?;
        let subtree = self.collect_subtree(id)?;
        self.locks
            .ensure_all_available(&subtree.lists)
            .inspect_err(|_| tracing::warn!(folder_id = %id, "delete rejected: contents busy"))?;

        // Breadth-first order reversed deletes children before their parents.
        let folders: Vec<FolderId> = subtree.folders.iter().rev().copied().collect();
        self.store.delete_tree(&subtree.lists, &folders)?;
        for list in &subtree.lists {
            self.notify(IndexEvent::ListRemoved(*list));
        }

        tracing::info!(
            folder_id = %id,
            folders = subtree.folders.len(),
            lists = subtree.lists.len(),
            "folder deleted"
        );
        Ok(FolderRemoval {
            folders: subtree.folders,
            lists: subtree.lists,
        })
    }

    /// Direct sub-folders and lists of `folder` (`None` = root).
    pub fn folder_contents(&self, folder: Option<FolderId>) -> Result<FolderContents, ApiError> {
        let current = match folder {
            Some(id) => Some(self.store.get_folder(id)?),
            None => None,
        };
        Ok(FolderContents {
            folder: current,
            folders: self.store.child_folders(folder)?,
            lists: self.store.lists_in_folder(folder)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{manager, payload, static_list};
    use super::*;

    #[test]
    fn create_list_rejects_sibling_name_case_insensitively() {
        let mut m = manager();
        m.create_list("VIP", None, ListKind::Static, None).unwrap();
        let err = m
            .create_list("vip", None, ListKind::Static, None)
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn folders_and_lists_share_a_namespace() {
        let mut m = manager();
        m.create_folder("Campaigns", None).unwrap();
        assert!(matches!(
            m.create_list("campaigns", None, ListKind::Static, None),
            Err(ApiError::Conflict(_))
        ));
    }

    #[test]
    fn same_name_is_allowed_in_different_folders() {
        let mut m = manager();
        let a = m.create_folder("A", None).unwrap();
        let b = m.create_folder("B", None).unwrap();
        m.create_list("VIP", Some(a.id), ListKind::Static, None).unwrap();
        assert!(m.create_list("VIP", Some(b.id), ListKind::Static, None).is_ok());
    }

    #[test]
    fn create_list_decodes_and_validates_name() {
        let mut m = manager();
        let list = m
            .create_list("Spring+Launch%20List", None, ListKind::Static, None)
            .unwrap();
        assert_eq!(list.name, "Spring Launch List");

        match m.create_list("bad/name", None, ListKind::Static, None) {
            Err(ApiError::InvalidName { message, .. }) => {
                assert_eq!(message, messages::INVALID_LIST_NAME)
            }
            other => panic!("expected InvalidName, got {other:?}"),
        }
    }

    #[test]
    fn convert_snapshots_segmented_list() {
        let mut m = manager();
        let folder = m.create_folder("Segments", None).unwrap();
        let segment = m
            .create_list(
                "Active",
                Some(folder.id),
                ListKind::Segmented,
                Some("last_visit > 30d".into()),
            )
            .unwrap();
        m.associate_contacts(segment.id, &[payload("a"), payload("b")])
            .unwrap();

        let converted_id = m.convert(segment.id).unwrap();
        let converted = m.get_list(converted_id).unwrap();
        assert_eq!(converted.name, "Active (converted)");
        assert_eq!(converted.kind, ListKind::Static);
        assert_eq!(converted.folder, Some(folder.id));
        assert_eq!(converted.source.include, vec![segment.id]);
        assert_eq!(m.get_contacts(converted_id).unwrap().count(), 2);
        assert!(!m.lock_manager().is_in_use(segment.id));
    }

    #[test]
    fn convert_of_long_name_stays_within_name_limit() {
        let mut m = manager();
        let long = "s".repeat(validation::NAME_MAX_LENGTH - 5);
        let segment = m
            .create_list(&long, None, ListKind::Segmented, None)
            .unwrap();

        let converted_id = m.convert(segment.id).unwrap();
        let converted = m.get_list(converted_id).unwrap();
        assert_eq!(converted.name.chars().count(), validation::NAME_MAX_LENGTH);
        assert!(converted.name.ends_with(" (converted)"));
        assert!(validation::is_valid_name(&converted.name));
    }

    #[test]
    fn converted_name_trims_whitespace_left_by_the_cut() {
        assert_eq!(converted_name("Active"), "Active (converted)");
        assert_eq!(
            converted_name(&format!("{} tail", "x".repeat(87))),
            format!("{} (converted)", "x".repeat(87))
        );
    }

    #[test]
    fn convert_rejects_static_lists() {
        let mut m = manager();
        let list = static_list(&mut m, "VIP");
        assert!(matches!(m.convert(list), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn delete_missing_list_is_silent() {
        let mut m = manager();
        assert!(!m.delete(ListId::new()).unwrap());
    }

    #[test]
    fn delete_locked_list_is_rejected() {
        let mut m = manager();
        let list = static_list(&mut m, "VIP");
        m.lock_manager().acquire(list, None).unwrap();

        assert!(matches!(m.delete(list), Err(ApiError::Locked { .. })));
        assert!(m.find_by_id(list).unwrap().is_some());
    }

    #[test]
    fn move_list_checks_destination_namespace() {
        let mut m = manager();
        let folder = m.create_folder("Archive", None).unwrap();
        m.create_list("VIP", Some(folder.id), ListKind::Static, None)
            .unwrap();
        let root_vip = static_list(&mut m, "VIP");

        assert!(matches!(
            m.move_list(root_vip, Some(folder.id)),
            Err(ApiError::Conflict(_))
        ));
        let other = static_list(&mut m, "Other");
        let moved = m.move_list(other, Some(folder.id)).unwrap();
        assert_eq!(moved.folder, Some(folder.id));
    }

    #[test]
    fn rename_folder_rejects_invalid_name_and_keeps_old_one() {
        let mut m = manager();
        let folder = m.create_folder("Campaigns", None).unwrap();

        match m.rename_folder(folder.id, "Q1?") {
            Err(ApiError::InvalidName { message, .. }) => {
                assert_eq!(message, messages::INVALID_FOLDER_NAME)
            }
            other => panic!("expected InvalidName, got {other:?}"),
        }
        let contents = m.folder_contents(None).unwrap();
        assert_eq!(contents.folders[0].name, "Campaigns");

        let renamed = m.rename_folder(folder.id, "Campaigns 2024").unwrap();
        assert_eq!(renamed.name, "Campaigns 2024");
    }

    #[test]
    fn rename_folder_with_locked_list_is_rejected() {
        let mut m = manager();
        let folder = m.create_folder("Campaigns", None).unwrap();
        let list = m
            .create_list("Spring", Some(folder.id), ListKind::Static, None)
            .unwrap();
        m.lock_manager().acquire(list.id, None).unwrap();

        assert!(matches!(
            m.rename_folder(folder.id, "Renamed"),
            Err(ApiError::Locked { .. })
        ));
    }

    #[test]
    fn move_folder_into_descendant_is_rejected() {
        let mut m = manager();
        let parent = m.create_folder("Parent", None).unwrap();
        let child = m.create_folder("Child", Some(parent.id)).unwrap();

        assert!(matches!(
            m.move_folder(parent.id, Some(child.id)),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            m.move_folder(parent.id, Some(parent.id)),
            Err(ApiError::BadRequest(_))
        ));
        let moved = m.move_folder(child.id, None).unwrap();
        assert_eq!(moved.parent, None);
    }

    #[test]
    fn delete_folder_cascades() {
        let mut m = manager();
        let top = m.create_folder("Top", None).unwrap();
        let nested = m.create_folder("Nested", Some(top.id)).unwrap();
        let a = m
            .create_list("A", Some(top.id), ListKind::Static, None)
            .unwrap();
        let b = m
            .create_list("B", Some(nested.id), ListKind::Static, None)
            .unwrap();

        let removal = m.delete_folder(top.id).unwrap();
        assert_eq!(removal.folders.len(), 2);
        assert_eq!(removal.lists.len(), 2);
        assert!(m.find_by_id(a.id).unwrap().is_none());
        assert!(m.find_by_id(b.id).unwrap().is_none());
        assert!(m.folder_contents(None).unwrap().folders.is_empty());
    }

    #[test]
    fn delete_folder_with_busy_list_deletes_nothing() {
        let mut m = manager();
        let top = m.create_folder("Top", None).unwrap();
        let nested = m.create_folder("Nested", Some(top.id)).unwrap();
        let busy = m
            .create_list("Busy", Some(nested.id), ListKind::Static, None)
            .unwrap();
        let locks = Arc::clone(m.lock_manager());
        let _guard = locks.mark_in_use(busy.id);

        match m.delete_folder(top.id) {
            Err(ApiError::Locked { message, lists }) => {
                assert_eq!(message, messages::FOLDER_CONTENTS_BUSY);
                assert_eq!(lists, vec![busy.id]);
            }
            other => panic!("expected Locked, got {other:?}"),
        }
        assert!(m.find_by_id(busy.id).unwrap().is_some());
    }

    #[test]
    fn folder_contents_of_missing_folder_is_not_found() {
        let m = manager();
        assert!(matches!(
            m.folder_contents(Some(FolderId::new())),
            Err(ApiError::NotFound(_))
        ));
    }
}
