//! Request body extractors that report failures through [`ApiError`].

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// `Json<T>` whose rejection is a 400 with the standard error body instead
/// of axum's plain-text 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                tracing::debug!(%rejection, "rejected request body");
                ApiError::BadRequest(rejection.body_text())
            })?;
        Ok(ApiJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;

    use crate::schema::folders::CreateFolderRequest;

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/folders")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn type_mismatch_is_a_bad_request() {
        let result = ApiJson::<CreateFolderRequest>::from_request(
            json_request(r#"{"name": 5}"#),
            &(),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn missing_name_defaults_to_empty() {
        let ApiJson(req) = ApiJson::<CreateFolderRequest>::from_request(json_request("{}"), &())
            .await
            .unwrap();
        assert!(req.name.is_empty());
        assert!(req.parent_id.is_none());
    }
}
