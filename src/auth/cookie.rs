//! Cookie parsing and `Set-Cookie` construction for session tokens.

use axum::http::{HeaderMap, header};

use crate::jwt::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};

/// Cookie name for the access token (short-lived, 15 minutes).
pub const ACCESS_COOKIE_NAME: &str = "accessToken";

/// Cookie name for the refresh token (long-lived, 7 days).
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

const EPOCH_HTTP_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                let value = value.trim();
                return (!value.is_empty()).then_some(value);
            }
        }
    }
    None
}

/// Extract the access token: the `accessToken` cookie first, then an
/// `Authorization: Bearer` header.
pub fn access_token_from(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = get_cookie(headers, ACCESS_COOKIE_NAME) {
        return Some(token);
    }
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Extract the refresh token from its cookie.
pub fn refresh_token_from(headers: &HeaderMap) -> Option<&str> {
    get_cookie(headers, REFRESH_COOKIE_NAME)
}

fn session_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
        name, value, max_age, secure
    )
}

/// `Set-Cookie` value carrying an access token.
pub fn access_cookie(token: &str, secure: bool) -> String {
    session_cookie(ACCESS_COOKIE_NAME, token, ACCESS_TOKEN_TTL_SECS, secure)
}

/// `Set-Cookie` value carrying a refresh token.
pub fn refresh_cookie(token: &str, secure: bool) -> String {
    session_cookie(REFRESH_COOKIE_NAME, token, REFRESH_TOKEN_TTL_SECS, secure)
}

/// `Set-Cookie` value that makes the client drop the named cookie.
pub fn expired_cookie(name: &str, secure: bool) -> String {
    format!(
        "{}; Expires={}",
        session_cookie(name, "", 0, secure),
        EPOCH_HTTP_DATE
    )
}
