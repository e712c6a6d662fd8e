//! Router assembly for the list management HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes in three
//! groups guarded by middleware, then adds CORS and tracing layers.

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{require_admin, require_editor, require_forgery_token};
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// - reads: list editor role
/// - edits: list editor role plus a valid request token
/// - admin: admin role plus a valid request token
///
/// Routes use axum 0.8 `/{param}` path syntax.
pub fn build_router(state: AppState) -> Router {
    let reads = Router::new()
        .route("/lists/{id}", get(handlers::lists::get_list))
        .route("/lists/{id}/contacts", get(handlers::contacts::list_contacts))
        .route("/lists/{id}/export", get(handlers::export::export_list))
        .route(
            "/folders/{id}/contents",
            get(handlers::folders::folder_contents),
        )
        .route("/locks", get(handlers::locks::lock_status))
        .route_layer(from_fn(require_editor));

    let edits = Router::new()
        // Lists
        .route("/lists", post(handlers::lists::create_list))
        .route("/lists/{id}/convert", post(handlers::lists::convert_list))
        .route("/lists/{id}/move", post(handlers::lists::move_list))
        .route("/lists/{id}/delete", post(handlers::lists::delete_list))
        // Contacts
        .route(
            "/lists/{id}/contacts/add",
            post(handlers::contacts::add_contact),
        )
        .route(
            "/lists/{id}/contacts/remove-all",
            post(handlers::contacts::remove_all_contacts),
        )
        .route(
            "/lists/{id}/contacts/{contact_id}/remove",
            post(handlers::contacts::remove_contact),
        )
        .route(
            "/lists/{id}/dedupe",
            post(handlers::contacts::remove_duplicates),
        )
        // Locks
        .route("/lists/{id}/lock", post(handlers::locks::lock_list))
        .route("/locks/{token}/release", post(handlers::locks::release_lock))
        // Folders
        .route("/folders", post(handlers::folders::create_folder))
        .route(
            "/folders/{id}/rename",
            post(handlers::folders::rename_folder),
        )
        .route("/folders/{id}/move", post(handlers::folders::move_folder))
        .route(
            "/folders/{id}/delete",
            post(handlers::folders::delete_folder),
        )
        .route_layer(from_fn_with_state(state.clone(), require_forgery_token))
        .route_layer(from_fn(require_editor));

    let admin = Router::new()
        .route("/lists/{id}/unlock", post(handlers::locks::unlock_list))
        .route_layer(from_fn_with_state(state.clone(), require_forgery_token))
        .route_layer(from_fn(require_admin));

    Router::new()
        .route("/health", get(handlers::health::health))
        .merge(reads)
        .merge(edits)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
