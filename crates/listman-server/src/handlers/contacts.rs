//! Contact association handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use listman_core::ContactPayload;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::{parse_contact_id, parse_list_id};
use crate::messages;
use crate::schema::contacts::{AddContactResponse, ListContactsResponse, RemoveContactResponse};
use crate::schema::lists::RemovedCountResponse;
use crate::state::AppState;

/// `GET /lists/{id}/contacts`
pub async fn list_contacts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ListContactsResponse>, ApiError> {
    let list_id = parse_list_id(&id)?;
    let manager = state.manager.lock().await;
    let contacts = manager.get_contacts(list_id)?.collect();
    Ok(Json(ListContactsResponse { list_id, contacts }))
}

/// Validates a new contact and adds it to the list.
///
/// `POST /lists/{id}/contacts/add`
pub async fn add_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ContactPayload>,
) -> Result<(StatusCode, Json<AddContactResponse>), ApiError> {
    let list_id = parse_list_id(&id)?;
    let mut manager = state.manager.lock().await;
    let contact = manager.add_new_contact(list_id, &payload)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(AddContactResponse {
            message: messages::CONTACT_ADDED.to_string(),
            contact,
        }),
    ))
}

/// Removes every contact from the list.
///
/// `POST /lists/{id}/contacts/remove-all`
pub async fn remove_all_contacts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RemovedCountResponse>, ApiError> {
    let list_id = parse_list_id(&id)?;
    let mut manager = state.manager.lock().await;
    let removed = manager.remove_all_contact_associations(list_id)?;
    Ok(Json(RemovedCountResponse { removed }))
}

/// `POST /lists/{id}/contacts/{contact_id}/remove`
pub async fn remove_contact(
    State(state): State<AppState>,
    Path((id, contact_id)): Path<(String, String)>,
) -> Result<Json<RemoveContactResponse>, ApiError> {
    let list_id = parse_list_id(&id)?;
    let contact_id = parse_contact_id(&contact_id)?;
    let mut manager = state.manager.lock().await;
    let removed = manager.remove_contact(list_id, contact_id)?;
    Ok(Json(RemoveContactResponse { removed }))
}

/// Collapses duplicate associations.
///
/// `POST /lists/{id}/dedupe`
pub async fn remove_duplicates(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RemovedCountResponse>, ApiError> {
    let list_id = parse_list_id(&id)?;
    let mut manager = state.manager.lock().await;
    let removed = manager.remove_duplicates(list_id)?;
    Ok(Json(RemovedCountResponse { removed }))
}
