//! Lock management handlers.

use axum::extract::{Path, State};
use axum::Json;

use crate::concurrency::{LockGrant, LockToken};
use crate::error::ApiError;
use crate::handlers::parse_list_id;
use crate::middleware::Caller;
use crate::schema::locks::{LockStatusResponse, UnlockResponse};
use crate::state::AppState;

/// Takes the exclusive lock on a list for the calling user.
///
/// `POST /lists/{id}/lock`
pub async fn lock_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<Json<LockGrant>, ApiError> {
    let list_id = parse_list_id(&id)?;
    // The manager guard is held across the grant so a concurrent delete
    // cannot remove the list in between.
    let manager = state.manager.lock().await;
    manager.get_list(list_id)?;
    let grant = state.lock_manager.acquire(list_id, caller.name)?;
    Ok(Json(grant))
}

/// Releases a lock. Unknown or expired tokens are ignored.
///
/// `POST /locks/{token}/release`
pub async fn release_lock(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token: LockToken = token
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid lock token '{}'", token)))?;
    state.lock_manager.release(token)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// `GET /locks`
pub async fn lock_status(State(state): State<AppState>) -> Json<LockStatusResponse> {
    Json(LockStatusResponse {
        locks: state.lock_manager.status(),
    })
}

/// Force-releases whatever lock a list holds. Administrators only.
///
/// `POST /lists/{id}/unlock`
pub async fn unlock_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<Json<UnlockResponse>, ApiError> {
    let list_id = parse_list_id(&id)?;
    let released = state.lock_manager.unlock(list_id);
    if released.is_some() {
        tracing::info!(
            %list_id,
            admin = caller.name.as_deref().unwrap_or("<anonymous>"),
            "list unlocked by administrator"
        );
    }
    Ok(Json(UnlockResponse { released }))
}
