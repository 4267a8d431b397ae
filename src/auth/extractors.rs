//! Axum extractors for authenticated handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::errors::AuthError;
use crate::jwt::{Claims, TokenKind};

/// Claims of the access credential the gate accepted (or just minted) for
/// this request.
///
/// Only present on routes behind the access gate; elsewhere the extractor
/// rejects with 401.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Authenticated>()
            .cloned()
            .ok_or(AuthError::MissingToken(TokenKind::Access))
    }
}
