//! Caller identity extraction.
//!
//! The upstream identity provider authenticates the caller and forwards the
//! result in two headers; this module turns them into an [`Identity`].

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::models::{Identity, Role};

use super::response::ApiErrorResponse;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the caller's role (`staff` or `admin`).
pub const USER_ROLE_HEADER: &str = "x-user-role";

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn missing(name: &str) -> ApiErrorResponse {
    ApiErrorResponse::unauthenticated(format!("missing {} header", name))
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER).ok_or_else(|| missing(USER_ID_HEADER))?;
        let role: Role = header(parts, USER_ROLE_HEADER)
            .ok_or_else(|| missing(USER_ROLE_HEADER))?
            .parse()
            .map_err(ApiErrorResponse::unauthenticated)?;

        Ok(Identity::new(user_id, role))
    }
}
