//! Refresh token exchange.
//!
//! The refresh token is never rotated: it stays usable until its own expiry
//! and every exchange mints an independent access token.

use std::sync::Arc;

use tracing::{debug, info};

use super::errors::AuthError;
use crate::jwt::{ACCESS_TOKEN_TTL_SECS, IssuedToken, TokenCodec, TokenKind};

/// Mints replacement access tokens from valid refresh tokens.
#[derive(Clone)]
pub struct RefreshService {
    codec: Arc<TokenCodec>,
}

impl RefreshService {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Exchange a refresh token for a new access token for the same subject.
    pub fn refresh(&self, refresh_token: Option<&str>) -> Result<IssuedToken, AuthError> {
        let token = refresh_token.ok_or(AuthError::MissingToken(TokenKind::Refresh))?;

        let claims = self
            .codec
            .verify_kind(token, TokenKind::Refresh)
            .map_err(|e| {
                debug!(error = %e, "Refresh token rejected");
                AuthError::from(e)
            })?;

        let access = self
            .codec
            .issue(&claims.sub, TokenKind::Access, ACCESS_TOKEN_TTL_SECS)?;

        info!(subject = %claims.sub, "Access token refreshed");
        Ok(access)
    }
}
