//! Domain model: folders, contact lists, contacts.
//!
//! Folders form a tree whose root is implicit (`None` parent). Lists live in
//! exactly one folder. Contacts are not owned by lists; the link between a
//! list and a contact is an association record kept by the storage layer.

use serde::{Deserialize, Serialize};

use crate::id::{ContactId, FolderId, ListId};

/// How a list obtains its contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// Contacts are explicitly associated with the list.
    Static,
    /// Contacts are materialized from a segmentation query.
    Segmented,
}

/// Where a list's contacts are sourced from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSource {
    /// Lists whose contacts were pulled into this list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<ListId>,
    /// Segmentation query, for segmented lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl ListSource {
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.query.is_none()
    }

    /// Drops every source reference.
    pub fn clear(&mut self) {
        self.include.clear();
        self.query = None;
    }
}

/// A named collection of contact associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactList {
    pub id: ListId,
    pub name: String,
    /// Parent folder. `None` for lists at the root.
    pub folder: Option<FolderId>,
    pub kind: ListKind,
    #[serde(default)]
    pub source: ListSource,
}

impl ContactList {
    /// Creates a list with a fresh ID and no sources.
    pub fn new(name: impl Into<String>, folder: Option<FolderId>, kind: ListKind) -> Self {
        ContactList {
            id: ListId::new(),
            name: name.into(),
            folder,
            kind,
            source: ListSource::default(),
        }
    }
}

/// Hierarchical container for lists and sub-folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    /// Parent folder. `None` for top-level folders.
    pub parent: Option<FolderId>,
}

impl Folder {
    pub fn new(name: impl Into<String>, parent: Option<FolderId>) -> Self {
        Folder {
            id: FolderId::new(),
            name: name.into(),
            parent,
        }
    }
}

/// A contact shared across lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    /// External key, unique per contact.
    pub identifier: String,
    pub first_name: String,
    pub surname: String,
    pub preferred_email: String,
}

impl Contact {
    /// Builds a contact from a payload that already passed validation.
    ///
    /// Missing fields become empty strings; a payload without a `contact_id`
    /// gets a fresh ID.
    pub fn from_payload(payload: &ContactPayload) -> Self {
        Contact {
            id: payload.contact_id.unwrap_or_default(),
            identifier: payload.identifier.clone().unwrap_or_default(),
            first_name: payload.first_name.clone().unwrap_or_default(),
            surname: payload.surname.clone().unwrap_or_default(),
            preferred_email: payload.preferred_email.clone().unwrap_or_default(),
        }
    }
}

/// Unvalidated contact data as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPayload {
    #[serde(default)]
    pub contact_id: Option<ContactId>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub preferred_email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ListKind::Segmented).unwrap(),
            "\"segmented\""
        );
    }

    #[test]
    fn clearing_source_empties_it() {
        let mut source = ListSource {
            include: vec![ListId::new()],
            query: Some("country = 'DK'".into()),
        };
        assert!(!source.is_empty());
        source.clear();
        assert!(source.is_empty());
    }

    #[test]
    fn contact_from_payload_keeps_supplied_id() {
        let id = ContactId::new();
        let payload = ContactPayload {
            contact_id: Some(id),
            identifier: Some("jdoe".into()),
            preferred_email: Some("jdoe@example.com".into()),
            first_name: Some("Jane".into()),
            surname: Some("Doe".into()),
        };
        let contact = Contact::from_payload(&payload);
        assert_eq!(contact.id, id);
        assert_eq!(contact.identifier, "jdoe");
    }

    #[test]
    fn payload_fields_default_when_absent() {
        let payload: ContactPayload = serde_json::from_str(r#"{"identifier":"x"}"#).unwrap();
        assert_eq!(payload.identifier.as_deref(), Some("x"));
        assert!(payload.preferred_email.is_none());
        assert!(payload.contact_id.is_none());
    }
}
