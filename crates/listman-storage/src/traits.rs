//! The [`ListStore`] trait defining the storage contract for list data.
//!
//! The store is a plain persistence layer: it owns identity lookups and row
//! CRUD but enforces none of the domain rules (name uniqueness, lock state,
//! association idempotence). Those live in the server's `ListManager`.
//!
//! All backends (InMemoryStore, SqliteStore) implement this trait, so they
//! are fully swappable without changing the manager.

use listman_core::{Contact, ContactId, ContactList, Folder, FolderId, ListId};

use crate::error::StorageError;

/// The storage contract for folders, lists, contacts, and associations.
///
/// The trait is synchronous; callers serialize access through a mutex.
pub trait ListStore: Send {
    // -------------------------------------------------------------------
    // Folders
    // -------------------------------------------------------------------

    /// Inserts a new folder. The parent, if any, must exist.
    fn insert_folder(&mut self, folder: &Folder) -> Result<(), StorageError>;

    /// Looks up a folder by ID.
    fn find_folder(&self, id: FolderId) -> Result<Option<Folder>, StorageError>;

    /// Like [`find_folder`](Self::find_folder) but missing is an error.
    fn get_folder(&self, id: FolderId) -> Result<Folder, StorageError> {
        self.find_folder(id)?
            .ok_or(StorageError::FolderNotFound(id))
    }

    /// Overwrites the name and parent of an existing folder.
    fn update_folder(&mut self, folder: &Folder) -> Result<(), StorageError>;

    /// Deletes an empty folder row. Fails with an integrity error if the
    /// folder still has children.
    fn delete_folder(&mut self, id: FolderId) -> Result<(), StorageError>;

    /// Direct sub-folders of `parent` (`None` = root), ordered by name.
    fn child_folders(&self, parent: Option<FolderId>) -> Result<Vec<Folder>, StorageError>;

    // -------------------------------------------------------------------
    // Lists
    // -------------------------------------------------------------------

    /// Inserts a new list. The folder, if any, must exist.
    fn insert_list(&mut self, list: &ContactList) -> Result<(), StorageError>;

    /// Looks up a list by ID.
    fn find_list(&self, id: ListId) -> Result<Option<ContactList>, StorageError>;

    /// Like [`find_list`](Self::find_list) but missing is an error.
    fn get_list(&self, id: ListId) -> Result<ContactList, StorageError> {
        self.find_list(id)?.ok_or(StorageError::ListNotFound(id))
    }

    /// Overwrites an existing list.
    fn update_list(&mut self, list: &ContactList) -> Result<(), StorageError>;

    /// Deletes a list and all of its association rows.
    ///
    /// Returns `false` if the list did not exist.
    fn delete_list(&mut self, id: ListId) -> Result<bool, StorageError>;

    /// Deletes `lists` (with their associations) and then `folders`, all
    /// or nothing. `folders` must be ordered children first and be empty
    /// once `lists` are gone.
    fn delete_tree(&mut self, lists: &[ListId], folders: &[FolderId]) -> Result<(), StorageError>;

    /// Lists directly inside `folder` (`None` = root), ordered by name.
    fn lists_in_folder(&self, folder: Option<FolderId>) -> Result<Vec<ContactList>, StorageError>;

    // -------------------------------------------------------------------
    // Contacts
    // -------------------------------------------------------------------

    /// Inserts a new contact.
    fn insert_contact(&mut self, contact: &Contact) -> Result<(), StorageError>;

    /// Looks up a contact by ID.
    fn find_contact(&self, id: ContactId) -> Result<Option<Contact>, StorageError>;

    /// Looks up a contact by its external identifier.
    fn find_contact_by_identifier(&self, identifier: &str)
        -> Result<Option<Contact>, StorageError>;

    // -------------------------------------------------------------------
    // Associations
    // -------------------------------------------------------------------

    /// Appends one association row. Does not check for an existing row.
    fn insert_association(&mut self, list: ListId, contact: ContactId)
        -> Result<(), StorageError>;

    /// Inserts `list` together with one association row per entry of
    /// `contacts`, all or nothing.
    fn insert_list_with_associations(
        &mut self,
        list: &ContactList,
        contacts: &[ContactId],
    ) -> Result<(), StorageError>;

    /// Contact IDs of every association row for `list`, one entry per row,
    /// in insertion order. Duplicated rows appear more than once.
    fn list_associations(&self, list: ListId) -> Result<Vec<ContactId>, StorageError>;

    /// Deletes every row linking `list` and `contact`. Returns rows removed.
    fn delete_associations(
        &mut self,
        list: ListId,
        contact: ContactId,
    ) -> Result<usize, StorageError>;

    /// Deletes every association row of `list`. Returns rows removed.
    fn delete_all_associations(&mut self, list: ListId) -> Result<usize, StorageError>;

    /// Replaces every association row of `list` with `contacts`, in order,
    /// all or nothing. Returns rows removed.
    fn replace_associations(
        &mut self,
        list: ListId,
        contacts: &[ContactId],
    ) -> Result<usize, StorageError>;
}
