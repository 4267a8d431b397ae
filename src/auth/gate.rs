//! Access gate middleware for API routes.
//!
//! Each protected request must carry a valid access token. If it is missing
//! a valid one but holds a valid refresh token, a single renewal is attempted:
//! the request is forwarded and the new access token is attached to the
//! response. The handler sees the renewed claims, but the client only starts
//! sending the new cookie on its next request.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::cookie::{access_cookie, access_token_from, refresh_token_from};
use super::errors::AuthError;
use super::extractors::Authenticated;
use super::state::AuthState;
use crate::jwt::TokenKind;

/// Prefix of every route the gate protects.
pub const API_PREFIX: &str = "/api";

/// Routes reachable without an access token.
const BYPASS_PATHS: &[&str] = &["/api/auth/login", "/api/auth/refresh-token"];

/// Whether the gate must authenticate a request for `path`.
pub fn requires_auth(path: &str) -> bool {
    let under_api = path == API_PREFIX
        || path
            .strip_prefix(API_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'));
    under_api && !BYPASS_PATHS.iter().any(|bypass| path.starts_with(bypass))
}

/// Middleware that authenticates API requests, renewing expired access
/// tokens from the refresh cookie at most once per request.
pub async fn access_gate(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if !requires_auth(&path) {
        return next.run(request).await;
    }

    let Some(access_token) = access_token_from(request.headers()).map(str::to_owned) else {
        debug!(path = %path, "Denied: no access token");
        return AuthError::MissingToken(TokenKind::Access).into_response();
    };

    match auth.codec.verify_kind(&access_token, TokenKind::Access) {
        Ok(claims) => {
            request.extensions_mut().insert(Authenticated(claims));
            return next.run(request).await;
        }
        Err(e) => debug!(path = %path, error = %e, "Access token rejected, trying refresh"),
    }

    let Some(refresh_token) = refresh_token_from(request.headers()) else {
        debug!(path = %path, "Denied: no refresh token");
        return AuthError::MissingToken(TokenKind::Refresh).into_response();
    };

    let renewed = match auth.refresher.refresh(Some(refresh_token)) {
        Ok(renewed) => renewed,
        Err(e) => {
            debug!(path = %path, error = %e, "Denied: refresh failed");
            return e.into_response();
        }
    };

    let cookie = access_cookie(&renewed.token, auth.secure_cookies);
    request
        .extensions_mut()
        .insert(Authenticated(renewed.claims));

    let mut response = next.run(request).await;
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => error!(error = %e, "Renewed access cookie is not a valid header"),
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bypass_paths() {
        assert!(!requires_auth("/api/auth/login"));
        assert!(!requires_auth("/api/auth/refresh-token"));
    }

    #[test]
    fn test_protected_paths() {
        assert!(requires_auth("/api"));
        assert!(requires_auth("/api/movies"));
        assert!(requires_auth("/api/movies/comments/123"));
        assert!(requires_auth("/api/auth/logout"));
        assert!(requires_auth("/api/auth/verify"));
    }

    #[test]
    fn test_non_api_paths() {
        assert!(!requires_auth("/"));
        assert!(!requires_auth("/apiary"));
        assert!(!requires_auth("/static/app.js"));
    }
}
