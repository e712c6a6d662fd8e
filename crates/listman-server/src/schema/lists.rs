//! Schema types for list endpoints.

use serde::{Deserialize, Serialize};

use listman_core::{ListId, ListKind};

/// Request to create a list.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateListRequest {
    #[serde(default)]
    pub name: String,
    /// Parent folder; absent, null, or `"~"` for the root.
    #[serde(default)]
    pub folder_id: Option<String>,
    /// Defaults to a static list.
    #[serde(default)]
    pub kind: Option<ListKind>,
    /// Segmentation query, segmented lists only.
    #[serde(default)]
    pub query: Option<String>,
}

/// Request to move a list or folder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoveRequest {
    /// Destination folder; absent, null, or `"~"` for the root.
    #[serde(default)]
    pub destination_id: Option<String>,
}

/// Response after converting a segmented list.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertListResponse {
    /// The new static list.
    pub id: ListId,
}

/// Response after deleting a list.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteListResponse {
    /// `false` when the list did not exist.
    pub deleted: bool,
}

/// Response carrying a removal count.
#[derive(Debug, Clone, Serialize)]
pub struct RemovedCountResponse {
    pub removed: usize,
}
