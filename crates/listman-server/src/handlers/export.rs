//! Contact export handler.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;

use crate::error::ApiError;
use crate::handlers::parse_list_id;
use crate::state::AppState;

/// Streams the list's contacts as a CSV attachment.
///
/// `GET /lists/{id}/export`
pub async fn export_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let list_id = parse_list_id(&id)?;
    let export = {
        let manager = state.manager.lock().await;
        manager.export_contacts(list_id)?
    };

    let file_name = export.file_name(chrono::Local::now().date_naive());
    let rows = export.into_csv_rows().map(Ok::<_, Infallible>);
    let body = Body::from_stream(futures::stream::iter(rows));

    Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_DISPOSITION, content_disposition(&file_name))
        .body(body)
        .map_err(|e| ApiError::InternalError(format!("failed to build export response: {}", e)))
}

/// `attachment` disposition with an ASCII fallback and the UTF-8 name.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}
