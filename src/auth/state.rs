//! Shared authentication state built once at startup.

use std::sync::Arc;

use super::credentials::{CredentialVerifier, Principal};
use super::refresh::RefreshService;
use super::session::SessionIssuer;
use crate::jwt::TokenCodec;

/// Everything the auth handlers and the access gate need, injected from the
/// startup configuration.
#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<TokenCodec>,
    pub sessions: SessionIssuer,
    pub refresher: RefreshService,
    /// Whether to set the Secure flag on session cookies
    pub secure_cookies: bool,
}

impl AuthState {
    pub fn new(jwt_secret: &[u8], root: Principal, secure_cookies: bool) -> Self {
        let codec = Arc::new(TokenCodec::new(jwt_secret));
        Self {
            sessions: SessionIssuer::new(codec.clone(), CredentialVerifier::new(root)),
            refresher: RefreshService::new(codec.clone()),
            codec,
            secure_cookies,
        }
    }
}
