//! HTTP handler modules for the list management API.
//!
//! Each sub-module implements thin handlers that parse requests, acquire the
//! manager lock, delegate to [`ListManager`](crate::manager::ListManager),
//! and return JSON responses. No business logic lives in handlers.

pub mod contacts;
pub mod export;
pub mod folders;
pub mod health;
pub mod lists;
pub mod locks;

use listman_core::{ContactId, FolderId, ListId};

use crate::error::ApiError;

/// Path and body value that names the root folder.
pub const ROOT_FOLDER: &str = "~";

pub(crate) fn parse_list_id(raw: &str) -> Result<ListId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid list id '{}'", raw)))
}

pub(crate) fn parse_contact_id(raw: &str) -> Result<ContactId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid contact id '{}'", raw)))
}

/// Resolves a folder reference; `None`, empty, and `"~"` mean the root.
pub(crate) fn parse_folder_ref(raw: Option<&str>) -> Result<Option<FolderId>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") | Some(ROOT_FOLDER) => Ok(None),
        Some(id) => id
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("invalid folder id '{}'", id))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_refs_resolve_root_aliases() {
        assert_eq!(parse_folder_ref(None).unwrap(), None);
        assert_eq!(parse_folder_ref(Some("~")).unwrap(), None);
        assert_eq!(parse_folder_ref(Some("")).unwrap(), None);

        let id = FolderId::new();
        assert_eq!(parse_folder_ref(Some(&id.to_string())).unwrap(), Some(id));
        assert!(matches!(
            parse_folder_ref(Some("nope")),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn malformed_ids_are_bad_requests() {
        assert!(matches!(parse_list_id("42"), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_contact_id("x"), Err(ApiError::BadRequest(_))));
    }
}
