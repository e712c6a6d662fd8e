//! Contact association engine: links contacts to lists, removes links,
//! and repairs duplicate association rows.

use std::collections::HashSet;

use listman_core::{validation, Contact, ContactId, ContactPayload, CoreError, ListId};

use crate::error::ApiError;
use crate::index::IndexEvent;
use crate::messages;

use super::ListManager;

impl ListManager {
    /// Finds the contact a payload refers to (by ID, then by identifier) or
    /// creates it from the payload. Creation requires a valid payload.
    fn resolve_contact(&mut self, payload: &ContactPayload) -> Result<Contact, ApiError> {
        if let Some(id) = payload.contact_id {
            if let Some(contact) = self.store.find_contact(id)? {
                return Ok(contact);
            }
        }
        if let Some(identifier) = payload.identifier.as_deref() {
            if let Some(contact) = self.store.find_contact_by_identifier(identifier)? {
                return Ok(contact);
            }
        }

        validation::validate_contact_payload(payload).into_result()?;
        let contact = Contact::from_payload(payload);
        self.store.insert_contact(&contact)?;
        tracing::debug!(contact_id = %contact.id, "contact created");
        Ok(contact)
    }

    /// Links each contact to the list, creating contacts that do not exist.
    ///
    /// Contacts already associated are skipped, so repeating the call is
    /// harmless. Returns the number of new associations.
    pub fn associate_contacts(
        &mut self,
        list_id: ListId,
        contacts: &[ContactPayload],
    ) -> Result<usize, ApiError> {
        self.get_list(list_id)?;
        self.locks.ensure_available(list_id)?;

        let mut associated: HashSet<ContactId> =
            self.store.list_associations(list_id)?.into_iter().collect();
        let mut added = 0;
        for payload in contacts {
            let contact = self.resolve_contact(payload)?;
            if associated.insert(contact.id) {
                self.store.insert_association(list_id, contact.id)?;
                added += 1;
            }
        }

        if added > 0 {
            tracing::info!(%list_id, added, "contacts associated");
            self.notify(IndexEvent::ListChanged(list_id));
        }
        Ok(added)
    }

    /// Validates a new contact and adds it to the list.
    ///
    /// The contact becomes searchable once the index has processed the
    /// refresh request emitted here.
    pub fn add_new_contact(
        &mut self,
        list_id: ListId,
        payload: &ContactPayload,
    ) -> Result<Contact, ApiError> {
        validation::validate_contact_payload(payload).into_result()?;

        if self.store.find_list(list_id)?.is_none() {
            let identifier = payload.identifier.as_deref().unwrap_or_default();
            return Err(ApiError::BadRequest(messages::add_contact_list_not_found(
                identifier,
                &list_id.to_string(),
            )));
        }
        self.locks.ensure_available(list_id).inspect_err(|_| {
            tracing::warn!(%list_id, "add contact rejected: list busy");
        })?;

        let contact = self.resolve_contact(payload)?;
        let already = self
            .store
            .list_associations(list_id)?
            .contains(&contact.id);
        if !already {
            self.store.insert_association(list_id, contact.id)?;
        }

        tracing::info!(%list_id, contact_id = %contact.id, "contact added to list");
        self.notify(IndexEvent::ListChanged(list_id));
        Ok(contact)
    }

    /// Removes every association of the list and clears its sources.
    ///
    /// Returns the number of distinct contacts that were associated.
    pub fn remove_all_contact_associations(&mut self, list_id: ListId) -> Result<usize, ApiError> {
        let mut list = self.get_list(list_id)?;
        self.locks.ensure_available(list_id)?;

        let removed = self
            .store
            .list_associations(list_id)?
            .into_iter()
            .collect::<HashSet<_>>()
            .len();
        self.store.delete_all_associations(list_id)?;
        if !list.source.is_empty() {
            list.source.clear();
            self.store.update_list(&list)?;
        }

        tracing::info!(%list_id, removed, "all contact associations removed");
        self.notify(IndexEvent::ListChanged(list_id));
        Ok(removed)
    }

    /// Removes the given contacts from the list.
    ///
    /// Returns how many of them were associated: a contact that was not on
    /// the list does not count.
    pub fn remove_contact_associations(
        &mut self,
        list_id: ListId,
        contacts: &[ContactId],
    ) -> Result<usize, ApiError> {
        self.get_list(list_id)?;
        self.locks.ensure_available(list_id)?;

        let mut seen = HashSet::new();
        let mut removed = 0;
        for contact in contacts {
            if seen.insert(*contact) && self.store.delete_associations(list_id, *contact)? > 0 {
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(%list_id, removed, "contact associations removed");
            self.notify(IndexEvent::ListChanged(list_id));
        }
        Ok(removed)
    }

    /// Removes a single contact from the list. Returns whether it was there.
    pub fn remove_contact(&mut self, list_id: ListId, contact: ContactId) -> Result<bool, ApiError> {
        if self.store.find_list(list_id)?.is_none() {
            return Err(ApiError::NotFound(messages::remove_contact_list_not_found(
                &contact.to_string(),
                &list_id.to_string(),
            )));
        }
        Ok(self.remove_contact_associations(list_id, &[contact])? == 1)
    }

    /// Collapses repeated associations so each contact is linked once.
    ///
    /// Returns the number of association rows removed.
    pub fn remove_duplicates(&mut self, list_id: ListId) -> Result<usize, ApiError> {
        self.get_list(list_id)?;
        self.locks.ensure_available(list_id)?;

        let rows = self.store.list_associations(list_id)?;
        let mut seen = HashSet::new();
        let unique: Vec<ContactId> = rows.iter().copied().filter(|c| seen.insert(*c)).collect();
        let removed = rows.len() - unique.len();
        if removed > 0 {
            self.store.replace_associations(list_id, &unique)?;
        }

        if removed > 0 {
            tracing::info!(%list_id, removed, "duplicate associations removed");
            self.notify(IndexEvent::ListChanged(list_id));
        }
        Ok(removed)
    }

    /// The list's contacts, each once, in association order.
    pub fn get_contacts(&self, list_id: ListId) -> Result<impl Iterator<Item = Contact>, ApiError> {
        self.get_list(list_id)?;

        let mut seen = HashSet::new();
        let mut contacts = Vec::new();
        for id in self.store.list_associations(list_id)? {
            if !seen.insert(id) {
                continue;
            }
            match self.store.find_contact(id)? {
                Some(contact) => contacts.push(contact),
                None => return Err(CoreError::ContactNotFound { id }.into()),
            }
        }
        Ok(contacts.into_iter())
    }
}
