//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::jwt::{TokenError, TokenKind};

/// Errors raised by login, refresh, logout and the access gate.
///
/// Every verification failure maps to the same 401 message so clients cannot
/// tell an expired token from a forged one.
#[derive(Debug)]
pub enum AuthError {
    MissingCredentials,
    InvalidCredentials,
    /// No token of the given kind was presented
    MissingToken(TokenKind),
    MalformedToken,
    InvalidSignature,
    ExpiredToken,
    WrongTokenKind,
    Internal,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::MissingToken(_)
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::ExpiredToken
            | AuthError::WrongTokenKind => StatusCode::UNAUTHORIZED,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "Missing credentials",
            AuthError::InvalidCredentials => "Invalid credentials",
            AuthError::MissingToken(TokenKind::Access) => "Unauthorized: Missing access token",
            AuthError::MissingToken(TokenKind::Refresh) => "Unauthorized: Missing refresh token",
            AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::ExpiredToken
            | AuthError::WrongTokenKind => "Unauthorized: Invalid or expired token",
            AuthError::Internal => "Internal Server Error",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Malformed => AuthError::MalformedToken,
            TokenError::InvalidSignature => AuthError::InvalidSignature,
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::WrongKind { .. } => AuthError::WrongTokenKind,
            TokenError::Encoding(e) => {
                tracing::error!(error = %e, "Failed to sign token");
                AuthError::Internal
            }
            TokenError::Clock => {
                tracing::error!("System clock is before the Unix epoch");
                AuthError::Internal
            }
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MalformedToken => write!(f, "Malformed token"),
            AuthError::InvalidSignature => write!(f, "Invalid token signature"),
            AuthError::ExpiredToken => write!(f, "Expired token"),
            AuthError::WrongTokenKind => write!(f, "Wrong token kind"),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for AuthError {}

#[derive(Serialize)]
struct ErrorResponse {
    status: u16,
    message: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            Json(ErrorResponse {
                status: status.as_u16(),
                message: self.message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::MissingCredentials.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::MissingToken(TokenKind::Refresh).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Internal.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_verification_failures_share_message() {
        let messages: Vec<_> = [
            AuthError::MalformedToken,
            AuthError::InvalidSignature,
            AuthError::ExpiredToken,
            AuthError::WrongTokenKind,
        ]
        .iter()
        .map(|e| (e.status_code(), e.message()))
        .collect();

        assert!(messages.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(messages[0].0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_token_error_mapping() {
        assert!(matches!(
            AuthError::from(TokenError::Expired),
            AuthError::ExpiredToken
        ));
        assert!(matches!(
            AuthError::from(TokenError::InvalidSignature),
            AuthError::InvalidSignature
        ));
        assert!(matches!(
            AuthError::from(TokenError::Malformed),
            AuthError::MalformedToken
        ));
        assert!(matches!(
            AuthError::from(TokenError::WrongKind {
                expected: TokenKind::Refresh,
                found: TokenKind::Access,
            }),
            AuthError::WrongTokenKind
        ));
        assert!(matches!(
            AuthError::from(TokenError::Clock),
            AuthError::Internal
        ));
    }
}
