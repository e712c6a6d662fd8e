//! Request guards: role checks and the forgery-token check.
//!
//! Identity is established upstream; the caller's name and roles arrive in
//! trusted headers (`X-User-Name`, `X-User-Roles`). Mutating requests must
//! also echo the shared request token in `X-Request-Token`.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_ROLES_HEADER: &str = "x-user-roles";
pub const REQUEST_TOKEN_HEADER: &str = "x-request-token";

/// Roles recognised by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// May browse and edit folders and lists.
    ListEditor,
    /// May additionally force-unlock lists. Implies `ListEditor`.
    Admin,
}

impl Role {
    fn parse(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "list-editor" => Some(Role::ListEditor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// The authenticated caller as described by the trusted headers.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub name: Option<String>,
    pub roles: Vec<Role>,
}

impl Caller {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let name = headers
            .get(USER_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let roles = headers
            .get(USER_ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|raw| raw.split(',').filter_map(Role::parse).collect())
            .unwrap_or_default();
        Caller { name, roles }
    }

    pub fn has_role(&self, role: Role) -> bool {
        match role {
            Role::ListEditor => self
                .roles
                .iter()
                .any(|r| matches!(r, Role::ListEditor | Role::Admin)),
            Role::Admin => self.roles.contains(&Role::Admin),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller::from_headers(&parts.headers))
    }
}

/// Checks the anti-forgery token sent with a mutating request.
pub trait ForgeryTokenValidator: Send + Sync {
    fn validate(&self, token: Option<&str>) -> bool;
}

/// Accepts exactly one configured token. With no token configured every
/// request is rejected.
#[derive(Debug, Clone, Default)]
pub struct SharedSecretValidator {
    secret: Option<String>,
}

impl SharedSecretValidator {
    pub fn new(secret: Option<String>) -> Self {
        SharedSecretValidator { secret }
    }
}

impl ForgeryTokenValidator for SharedSecretValidator {
    fn validate(&self, token: Option<&str>) -> bool {
        match (self.secret.as_deref(), token) {
            (Some(secret), Some(token)) => constant_time_eq(secret.as_bytes(), token.as_bytes()),
            _ => false,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn require_role(request: &Request, role: Role) -> Result<(), ApiError> {
    let caller = Caller::from_headers(request.headers());
    if caller.has_role(role) {
        Ok(())
    } else {
        tracing::warn!(
            caller = caller.name.as_deref().unwrap_or("<anonymous>"),
            ?role,
            path = %request.uri().path(),
            "request rejected: missing role"
        );
        Err(ApiError::Forbidden(format!("{:?} role required", role)))
    }
}

/// Rejects callers without the list editor (or admin) role.
pub async fn require_editor(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&request, Role::ListEditor)?;
    Ok(next.run(request).await)
}

/// Rejects callers without the admin role.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&request, Role::Admin)?;
    Ok(next.run(request).await)
}

/// Rejects requests whose `X-Request-Token` fails validation.
pub async fn require_forgery_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(REQUEST_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if !state.forgery.validate(token) {
        tracing::warn!(path = %request.uri().path(), "request rejected: bad forgery token");
        return Err(ApiError::Forbidden("invalid request token".to_string()));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(roles: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ROLES_HEADER, HeaderValue::from_str(roles).unwrap());
        headers.insert(USER_NAME_HEADER, HeaderValue::from_static("alice"));
        headers
    }

    #[test]
    fn admin_implies_editor() {
        let caller = Caller::from_headers(&headers("admin"));
        assert!(caller.has_role(Role::ListEditor));
        assert!(caller.has_role(Role::Admin));
        assert_eq!(caller.name.as_deref(), Some("alice"));
    }

    #[test]
    fn editor_is_not_admin() {
        let caller = Caller::from_headers(&headers(" viewer , List-Editor"));
        assert!(caller.has_role(Role::ListEditor));
        assert!(!caller.has_role(Role::Admin));
    }

    #[test]
    fn missing_roles_header_grants_nothing() {
        let caller = Caller::from_headers(&HeaderMap::new());
        assert!(!caller.has_role(Role::ListEditor));
        assert!(caller.name.is_none());
    }

    #[test]
    fn shared_secret_validation() {
        let validator = SharedSecretValidator::new(Some("s3cret".into()));
        assert!(validator.validate(Some("s3cret")));
        assert!(!validator.validate(Some("s3cret!")));
        assert!(!validator.validate(None));

        let unconfigured = SharedSecretValidator::new(None);
        assert!(!unconfigured.validate(Some("anything")));
    }
}
