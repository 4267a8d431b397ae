//! Session issuing: login and logout.
//!
//! A session is just the pair of tokens handed to the client. Nothing is
//! stored server-side, so logout only tells the client to drop its cookies;
//! copies of the tokens held elsewhere stay valid until they expire.

use std::sync::Arc;

use tracing::{info, warn};

use super::credentials::CredentialVerifier;
use super::errors::AuthError;
use crate::jwt::{
    ACCESS_TOKEN_TTL_SECS, Claims, IssuedToken, REFRESH_TOKEN_TTL_SECS, TokenCodec, TokenKind,
};

/// Tokens delivered to a client at login.
#[derive(Debug, Clone)]
pub struct Session {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Verifies login attempts and mints session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    codec: Arc<TokenCodec>,
    verifier: CredentialVerifier,
}

impl SessionIssuer {
    pub fn new(codec: Arc<TokenCodec>, verifier: CredentialVerifier) -> Self {
        Self { codec, verifier }
    }

    /// Check the credentials and issue an access/refresh token pair.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        if !self.verifier.verify(username, password) {
            warn!("Rejected login with invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let subject = self.verifier.principal_name();
        let access = self
            .codec
            .issue(subject, TokenKind::Access, ACCESS_TOKEN_TTL_SECS)?;
        let refresh = self
            .codec
            .issue(subject, TokenKind::Refresh, REFRESH_TOKEN_TTL_SECS)?;

        info!(subject = %subject, "Session issued");
        Ok(Session { access, refresh })
    }

    /// Require a currently valid access token before letting the client
    /// discard its session.
    pub fn logout(&self, access_token: Option<&str>) -> Result<Claims, AuthError> {
        let token = access_token.ok_or(AuthError::MissingToken(TokenKind::Access))?;
        let claims = self.codec.verify_kind(token, TokenKind::Access)?;
        info!(subject = %claims.sub, "Session ended");
        Ok(claims)
    }
}
