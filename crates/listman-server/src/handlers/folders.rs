//! Folder handlers (create, browse, rename, move, delete).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use listman_core::{CoreError, Folder, FolderId};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::parse_folder_ref;
use crate::manager::{FolderContents, FolderRemoval};
use crate::schema::folders::{CreateFolderRequest, RenameFolderRequest};
use crate::schema::lists::MoveRequest;
use crate::state::AppState;

/// Resolves a folder path segment that must name a real folder.
fn existing_folder(raw: &str) -> Result<FolderId, ApiError> {
    parse_folder_ref(Some(raw))?.ok_or_else(|| {
        CoreError::InvalidInput {
            reason: "the root folder cannot be modified".to_string(),
        }
        .into()
    })
}

/// `POST /folders`
pub async fn create_folder(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<Folder>), ApiError> {
    let parent = parse_folder_ref(req.parent_id.as_deref())?;
    let mut manager = state.manager.lock().await;
    let folder = manager.create_folder(&req.name, parent)?;
    Ok((StatusCode::CREATED, Json(folder)))
}

/// Lists the direct children of a folder; `~` browses the root.
///
/// `GET /folders/{id}/contents`
pub async fn folder_contents(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FolderContents>, ApiError> {
    let folder = parse_folder_ref(Some(&id))?;
    let manager = state.manager.lock().await;
    Ok(Json(manager.folder_contents(folder)?))
}

/// `POST /folders/{id}/rename`
pub async fn rename_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<RenameFolderRequest>,
) -> Result<(StatusCode, Json<Folder>), ApiError> {
    let folder_id = existing_folder(&id)?;
    let mut manager = state.manager.lock().await;
    let folder = manager.rename_folder(folder_id, &req.new_name)?;
    Ok((StatusCode::CREATED, Json(folder)))
}

/// `POST /folders/{id}/move`
pub async fn move_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<MoveRequest>,
) -> Result<Json<Folder>, ApiError> {
    let folder_id = existing_folder(&id)?;
    let destination = parse_folder_ref(req.destination_id.as_deref())?;
    let mut manager = state.manager.lock().await;
    Ok(Json(manager.move_folder(folder_id, destination)?))
}

/// Deletes a folder and everything below it.
///
/// `POST /folders/{id}/delete`
pub async fn delete_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FolderRemoval>, ApiError> {
    let folder_id = existing_folder(&id)?;
    let mut manager = state.manager.lock().await;
    Ok(Json(manager.delete_folder(folder_id)?))
}
