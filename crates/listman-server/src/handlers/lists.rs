//! List lifecycle handlers (create, get, convert, move, delete).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use listman_core::{ContactList, ListKind};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::{parse_folder_ref, parse_list_id};
use crate::schema::lists::{
    ConvertListResponse, CreateListRequest, DeleteListResponse, MoveRequest,
};
use crate::state::AppState;

/// Creates a list.
///
/// `POST /lists`
pub async fn create_list(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateListRequest>,
) -> Result<(StatusCode, Json<ContactList>), ApiError> {
    let folder = parse_folder_ref(req.folder_id.as_deref())?;
    let kind = req.kind.unwrap_or(ListKind::Static);
    let mut manager = state.manager.lock().await;
    let list = manager.create_list(&req.name, folder, kind, req.query)?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// `GET /lists/{id}`
pub async fn get_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactList>, ApiError> {
    let list_id = parse_list_id(&id)?;
    let manager = state.manager.lock().await;
    Ok(Json(manager.get_list(list_id)?))
}

/// Snapshots a segmented list into a static one.
///
/// `POST /lists/{id}/convert`
pub async fn convert_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConvertListResponse>, ApiError> {
    let list_id = parse_list_id(&id)?;
    let mut manager = state.manager.lock().await;
    let id = manager.convert(list_id)?;
    Ok(Json(ConvertListResponse { id }))
}

/// Deletes a list. A missing list is not an error.
///
/// `POST /lists/{id}/delete`
pub async fn delete_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteListResponse>, ApiError> {
    let list_id = parse_list_id(&id)?;
    let mut manager = state.manager.lock().await;
    let deleted = manager.delete(list_id)?;
    Ok(Json(DeleteListResponse { deleted }))
}

/// `POST /lists/{id}/move`
pub async fn move_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<MoveRequest>,
) -> Result<Json<ContactList>, ApiError> {
    let list_id = parse_list_id(&id)?;
    let destination = parse_folder_ref(req.destination_id.as_deref())?;
    let mut manager = state.manager.lock().await;
    Ok(Json(manager.move_list(list_id, destination)?))
}
