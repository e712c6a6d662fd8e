//! Schema types for folder endpoints.

use serde::Deserialize;

/// Request to create a folder.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFolderRequest {
    /// Missing names are reported as empty by name validation.
    #[serde(default)]
    pub name: String,
    /// Parent folder; absent, null, or `"~"` for the root.
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Request to rename a folder.
#[derive(Debug, Clone, Deserialize)]
pub struct RenameFolderRequest {
    #[serde(default)]
    pub new_name: String,
}
