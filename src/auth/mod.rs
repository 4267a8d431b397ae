//! Stateless JWT session authentication.
//!
//! Login mints a short-lived access token (15 min) and a long-lived refresh
//! token (7 days). The access gate verifies the access token on every API
//! request and transparently renews it from the refresh token when needed.
//! No session state is kept server-side.

mod cookie;
mod credentials;
mod errors;
mod extractors;
mod gate;
mod refresh;
mod session;
mod state;

pub use cookie::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, access_cookie, access_token_from, expired_cookie,
    get_cookie, refresh_cookie, refresh_token_from,
};
pub use credentials::{CredentialVerifier, Principal};
pub use errors::AuthError;
pub use extractors::Authenticated;
pub use gate::{API_PREFIX, access_gate, requires_auth};
pub use refresh::RefreshService;
pub use session::{Session, SessionIssuer};
pub use state::AuthState;
