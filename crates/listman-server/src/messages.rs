//! User-facing message templates returned in API responses.

pub const LIST_BUSY: &str = "At the moment you cannot use or edit the list. Another user is using the list or its source. Please try again later.";

pub const FOLDER_CONTENTS_BUSY: &str = "Unable to delete or edit the folder. One or more of the lists contained within it, or their sources, are in use.";

pub const INVALID_FOLDER_NAME: &str = "Invalid folder name. Please use permitted characters.";

pub const INVALID_LIST_NAME: &str = "Invalid list name. Please use permitted characters.";

pub const CONTACT_ADDED: &str =
    "The contact has been added to the list and will be available after indexing.";

pub fn add_contact_list_not_found(identifier: &str, list_id: &str) -> String {
    format!(
        "Unable to add contact {} to list {}. The list is not found.",
        identifier, list_id
    )
}

pub fn remove_contact_list_not_found(contact_id: &str, list_id: &str) -> String {
    format!(
        "Unable to remove contact {} from list {}. The list is not found.",
        contact_id, list_id
    )
}
