//! Schema types for contact association endpoints.

use serde::Serialize;

use listman_core::{Contact, ListId};

/// A list's contacts.
#[derive(Debug, Clone, Serialize)]
pub struct ListContactsResponse {
    pub list_id: ListId,
    pub contacts: Vec<Contact>,
}

/// Response after removing a single contact from a list.
#[derive(Debug, Clone, Serialize)]
pub struct RemoveContactResponse {
    /// Whether the contact was on the list.
    pub removed: bool,
}

/// Response after adding a new contact; indexing happens later.
#[derive(Debug, Clone, Serialize)]
pub struct AddContactResponse {
    pub message: String,
    pub contact: Contact,
}
