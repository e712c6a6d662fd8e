//! In-memory implementation of [`ListStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and ephemeral
//! deployments. It stores all data in HashMaps with the same semantics as
//! the SQLite backend, including duplicate association rows.

use std::collections::HashMap;

use listman_core::{Contact, ContactId, ContactList, Folder, FolderId, ListId};

use crate::error::StorageError;
use crate::traits::ListStore;

/// HashMap-backed store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    folders: HashMap<FolderId, Folder>,
    lists: HashMap<ListId, ContactList>,
    contacts: HashMap<ContactId, Contact>,
    /// Association rows in insertion order.
    associations: Vec<(ListId, ContactId)>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_folder(&self, id: Option<FolderId>) -> Result<(), StorageError> {
        match id {
            Some(id) if !self.folders.contains_key(&id) => Err(StorageError::FolderNotFound(id)),
            _ => Ok(()),
        }
    }
}

fn sort_by_name<T>(items: &mut [T], name: impl Fn(&T) -> &str) {
    items.sort_by_key(|item| name(item).to_lowercase());
}

impl ListStore for InMemoryStore {
    fn insert_folder(&mut self, folder: &Folder) -> Result<(), StorageError> {
        self.ensure_folder(folder.parent)?;
        if self.folders.contains_key(&folder.id) {
            return Err(StorageError::IntegrityError {
                reason: format!("folder {} already exists", folder.id),
            });
        }
        self.folders.insert(folder.id, folder.clone());
        Ok(())
    }

    fn find_folder(&self, id: FolderId) -> Result<Option<Folder>, StorageError> {
        Ok(self.folders.get(&id).cloned())
    }

    fn update_folder(&mut self, folder: &Folder) -> Result<(), StorageError> {
        self.ensure_folder(folder.parent)?;
        match self.folders.get_mut(&folder.id) {
            Some(existing) => {
                *existing = folder.clone();
                Ok(())
            }
            None => Err(StorageError::FolderNotFound(folder.id)),
        }
    }

    fn delete_folder(&mut self, id: FolderId) -> Result<(), StorageError> {
        if !self.folders.contains_key(&id) {
            return Err(StorageError::FolderNotFound(id));
        }
        let has_children = self.folders.values().any(|f| f.parent == Some(id))
            || self.lists.values().any(|l| l.folder == Some(id));
        if has_children {
            return Err(StorageError::IntegrityError {
                reason: format!("folder {} is not empty", id),
            });
        }
        self.folders.remove(&id);
        Ok(())
    }

    fn child_folders(&self, parent: Option<FolderId>) -> Result<Vec<Folder>, StorageError> {
        let mut children: Vec<Folder> = self
            .folders
            .values()
            .filter(|f| f.parent == parent)
            .cloned()
            .collect();
        sort_by_name(&mut children, |f| &f.name);
        Ok(children)
    }

    fn insert_list(&mut self, list: &ContactList) -> Result<(), StorageError> {
        self.ensure_folder(list.folder)?;
        if self.lists.contains_key(&list.id) {
            return Err(StorageError::IntegrityError {
                reason: format!("list {} already exists", list.id),
            });
        }
        self.lists.insert(list.id, list.clone());
        Ok(())
    }

    fn find_list(&self, id: ListId) -> Result<Option<ContactList>, StorageError> {
        Ok(self.lists.get(&id).cloned())
    }

    fn update_list(&mut self, list: &ContactList) -> Result<(), StorageError> {
        self.ensure_folder(list.folder)?;
        match self.lists.get_mut(&list.id) {
            Some(existing) => {
                *existing = list.clone();
                Ok(())
            }
            None => Err(StorageError::ListNotFound(list.id)),
        }
    }

    fn delete_list(&mut self, id: ListId) -> Result<bool, StorageError> {
        if self.lists.remove(&id).is_none() {
            return Ok(false);
        }
        self.associations.retain(|(list, _)| *list != id);
        Ok(true)
    }

    fn delete_tree(&mut self, lists: &[ListId], folders: &[FolderId]) -> Result<(), StorageError> {
        let mut staged = self.clone();
        for list in lists {
            staged.delete_list(*list)?;
        }
        for folder in folders {
            staged.delete_folder(*folder)?;
        }
        *self = staged;
        Ok(())
    }

    fn lists_in_folder(&self, folder: Option<FolderId>) -> Result<Vec<ContactList>, StorageError> {
        let mut lists: Vec<ContactList> = self
            .lists
            .values()
            .filter(|l| l.folder == folder)
            .cloned()
            .collect();
        sort_by_name(&mut lists, |l| &l.name);
        Ok(lists)
    }

    fn insert_contact(&mut self, contact: &Contact) -> Result<(), StorageError> {
        if self.contacts.contains_key(&contact.id) {
            return Err(StorageError::IntegrityError {
                reason: format!("contact {} already exists", contact.id),
            });
        }
        self.contacts.insert(contact.id, contact.clone());
        Ok(())
    }

    fn find_contact(&self, id: ContactId) -> Result<Option<Contact>, StorageError> {
        Ok(self.contacts.get(&id).cloned())
    }

    fn find_contact_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Contact>, StorageError> {
        Ok(self
            .contacts
            .values()
            .find(|c| c.identifier == identifier)
            .cloned())
    }

    fn insert_association(
        &mut self,
        list: ListId,
        contact: ContactId,
    ) -> Result<(), StorageError> {
        if !self.lists.contains_key(&list) {
            return Err(StorageError::ListNotFound(list));
        }
        if !self.contacts.contains_key(&contact) {
            return Err(StorageError::ContactNotFound(contact));
        }
        self.associations.push((list, contact));
        Ok(())
    }

    fn insert_list_with_associations(
        &mut self,
        list: &ContactList,
        contacts: &[ContactId],
    ) -> Result<(), StorageError> {
        if let Some(missing) = contacts.iter().find(|c| !self.contacts.contains_key(c)) {
            return Err(StorageError::ContactNotFound(*missing));
        }
        self.insert_list(list)?;
        self.associations
            .extend(contacts.iter().map(|contact| (list.id, *contact)));
        Ok(())
    }

    fn list_associations(&self, list: ListId) -> Result<Vec<ContactId>, StorageError> {
        Ok(self
            .associations
            .iter()
            .filter(|(l, _)| *l == list)
            .map(|(_, c)| *c)
            .collect())
    }

    fn delete_associations(
        &mut self,
        list: ListId,
        contact: ContactId,
    ) -> Result<usize, StorageError> {
        let before = self.associations.len();
        self.associations
            .retain(|(l, c)| !(*l == list && *c == contact));
        Ok(before - self.associations.len())
    }

    fn delete_all_associations(&mut self, list: ListId) -> Result<usize, StorageError> {
        let before = self.associations.len();
        self.associations.retain(|(l, _)| *l != list);
        Ok(before - self.associations.len())
    }

    fn replace_associations(
        &mut self,
        list: ListId,
        contacts: &[ContactId],
    ) -> Result<usize, StorageError> {
        if !self.lists.contains_key(&list) {
            return Err(StorageError::ListNotFound(list));
        }
        if let Some(missing) = contacts.iter().find(|c| !self.contacts.contains_key(c)) {
            return Err(StorageError::ContactNotFound(*missing));
        }
        let removed = self.delete_all_associations(list)?;
        self.associations
            .extend(contacts.iter().map(|contact| (list, *contact)));
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listman_core::ListKind;

    fn contact(identifier: &str) -> Contact {
        Contact {
            id: ContactId::new(),
            identifier: identifier.to_string(),
            first_name: "First".into(),
            surname: "Last".into(),
            preferred_email: format!("{identifier}@example.com"),
        }
    }

    #[test]
    fn folder_roundtrip_and_children() {
        let mut store = InMemoryStore::new();
        let campaigns = Folder::new("Campaigns", None);
        let archive = Folder::new("archive", None);
        let nested = Folder::new("2024", Some(campaigns.id));
        store.insert_folder(&campaigns).unwrap();
        store.insert_folder(&archive).unwrap();
        store.insert_folder(&nested).unwrap();

        let roots = store.child_folders(None).unwrap();
        assert_eq!(
            roots.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["archive", "Campaigns"]
        );
        assert_eq!(store.child_folders(Some(campaigns.id)).unwrap(), vec![nested]);
    }

    #[test]
    fn insert_into_missing_folder_fails() {
        let mut store = InMemoryStore::new();
        let list = ContactList::new("Orphan", Some(FolderId::new()), ListKind::Static);
        assert!(matches!(
            store.insert_list(&list),
            Err(StorageError::FolderNotFound(_))
        ));
    }

    #[test]
    fn non_empty_folder_cannot_be_deleted() {
        let mut store = InMemoryStore::new();
        let folder = Folder::new("Campaigns", None);
        store.insert_folder(&folder).unwrap();
        let list = ContactList::new("Spring", Some(folder.id), ListKind::Static);
        store.insert_list(&list).unwrap();

        assert!(matches!(
            store.delete_folder(folder.id),
            Err(StorageError::IntegrityError { .. })
        ));
        store.delete_list(list.id).unwrap();
        store.delete_folder(folder.id).unwrap();
        assert!(store.find_folder(folder.id).unwrap().is_none());
    }

    #[test]
    fn associations_keep_duplicate_rows() {
        let mut store = InMemoryStore::new();
        let list = ContactList::new("VIP", None, ListKind::Static);
        store.insert_list(&list).unwrap();
        let a = contact("a");
        let b = contact("b");
        store.insert_contact(&a).unwrap();
        store.insert_contact(&b).unwrap();

        store.insert_association(list.id, a.id).unwrap();
        store.insert_association(list.id, a.id).unwrap();
        store.insert_association(list.id, b.id).unwrap();

        assert_eq!(store.list_associations(list.id).unwrap(), vec![a.id, a.id, b.id]);
        assert_eq!(store.delete_associations(list.id, a.id).unwrap(), 2);
        assert_eq!(store.delete_all_associations(list.id).unwrap(), 1);
        assert!(store.list_associations(list.id).unwrap().is_empty());
    }

    #[test]
    fn deleting_list_drops_associations_but_not_contacts() {
        let mut store = InMemoryStore::new();
        let list = ContactList::new("VIP", None, ListKind::Static);
        store.insert_list(&list).unwrap();
        let a = contact("a");
        store.insert_contact(&a).unwrap();
        store.insert_association(list.id, a.id).unwrap();

        assert!(store.delete_list(list.id).unwrap());
        assert!(!store.delete_list(list.id).unwrap());
        assert!(store.list_associations(list.id).unwrap().is_empty());
        assert!(store.find_contact(a.id).unwrap().is_some());
    }

    #[test]
    fn lookup_contact_by_identifier() {
        let mut store = InMemoryStore::new();
        let a = contact("jdoe");
        store.insert_contact(&a).unwrap();
        assert_eq!(store.find_contact_by_identifier("jdoe").unwrap(), Some(a));
        assert!(store.find_contact_by_identifier("JDOE").unwrap().is_none());
    }

    #[test]
    fn failed_tree_delete_changes_nothing() {
        let mut store = InMemoryStore::new();
        let outer = Folder::new("Outer", None);
        let inner = Folder::new("Inner", Some(outer.id));
        store.insert_folder(&outer).unwrap();
        store.insert_folder(&inner).unwrap();
        let list = ContactList::new("Spring", Some(inner.id), ListKind::Static);
        store.insert_list(&list).unwrap();

        // Parent before child: the outer folder is still non-empty.
        let result = store.delete_tree(&[list.id], &[outer.id, inner.id]);
        assert!(matches!(result, Err(StorageError::IntegrityError { .. })));
        assert!(store.find_list(list.id).unwrap().is_some());
        assert!(store.find_folder(inner.id).unwrap().is_some());

        store.delete_tree(&[list.id], &[inner.id, outer.id]).unwrap();
        assert!(store.child_folders(None).unwrap().is_empty());
    }

    #[test]
    fn replace_associations_rejects_unknown_contact_untouched() {
        let mut store = InMemoryStore::new();
        let list = ContactList::new("VIP", None, ListKind::Static);
        store.insert_list(&list).unwrap();
        let a = contact("a");
        store.insert_contact(&a).unwrap();
        store.insert_association(list.id, a.id).unwrap();
        store.insert_association(list.id, a.id).unwrap();

        assert!(matches!(
            store.replace_associations(list.id, &[a.id, ContactId::new()]),
            Err(StorageError::ContactNotFound(_))
        ));
        assert_eq!(store.list_associations(list.id).unwrap(), vec![a.id, a.id]);

        assert_eq!(store.replace_associations(list.id, &[a.id]).unwrap(), 2);
        assert_eq!(store.list_associations(list.id).unwrap(), vec![a.id]);
    }
}
