//! Stable ID newtypes for list-management entities.
//!
//! All IDs are distinct newtype wrappers over `Uuid`, providing type safety
//! so that a `ListId` cannot be accidentally used where a `FolderId` is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact list identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(pub Uuid);

/// Folder identity. The root folder has no ID; it is modelled as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub Uuid);

/// Globally unique contact identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub Uuid);

impl ListId {
    /// Allocates a fresh random list ID.
    pub fn new() -> Self {
        ListId(Uuid::new_v4())
    }
}

impl FolderId {
    /// Allocates a fresh random folder ID.
    pub fn new() -> Self {
        FolderId(Uuid::new_v4())
    }
}

impl ContactId {
    /// Allocates a fresh random contact ID.
    pub fn new() -> Self {
        ContactId(Uuid::new_v4())
    }
}

impl Default for ListId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for FolderId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ContactId {
    fn default() -> Self {
        Self::new()
    }
}

// Display implementations -- just print the inner value.

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ListId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(ListId)
    }
}

impl FromStr for FolderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(FolderId)
    }
}

impl FromStr for ContactId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(ContactId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_distinct() {
        assert_ne!(ListId::new(), ListId::new());
        assert_ne!(ContactId::new(), ContactId::new());
    }

    #[test]
    fn display_prints_hyphenated_uuid() {
        let raw = Uuid::parse_str("6f1c2c1e-8c0a-4a52-9a57-1f7a3c9b0d11").unwrap();
        assert_eq!(
            FolderId(raw).to_string(),
            "6f1c2c1e-8c0a-4a52-9a57-1f7a3c9b0d11"
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<ContactId>().is_err());
        let id = ListId::new();
        assert_eq!(id.to_string().parse::<ListId>().unwrap(), id);
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = ListId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
