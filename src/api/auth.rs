//! Session endpoints.
//!
//! - POST `/login` - Exchange root credentials for an access/refresh pair
//! - POST `/refresh-token` - Exchange the refresh cookie for a new access token
//! - DELETE `/logout` - Expire both session cookies
//! - GET `/verify` - Describe the access credential of the current request

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::auth::{
    ACCESS_COOKIE_NAME, AuthState, Authenticated, REFRESH_COOKIE_NAME, access_cookie,
    access_token_from, expired_cookie, refresh_cookie, refresh_token_from,
};

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/logout", delete(logout))
        .route("/verify", get(verify))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    status: u16,
    access_token: String,
    expires_in: u64,
}

#[derive(Serialize)]
struct MessageResponse {
    status: u16,
    message: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    status: u16,
    subject: String,
    expires_at: u64,
}

/// Verify the root credentials and start a session.
/// The access token is returned in the body and both tokens are set as
/// HTTP-only cookies.
async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;

    let session = state.sessions.login(
        body.username.as_deref().unwrap_or_default(),
        body.password.as_deref().unwrap_or_default(),
    )?;

    let cookies = AppendHeaders([
        (
            SET_COOKIE,
            access_cookie(&session.access.token, state.secure_cookies),
        ),
        (
            SET_COOKIE,
            refresh_cookie(&session.refresh.token, state.secure_cookies),
        ),
    ]);

    Ok((
        StatusCode::OK,
        cookies,
        Json(TokenResponse {
            status: StatusCode::OK.as_u16(),
            expires_in: session.access.ttl_secs(),
            access_token: session.access.token,
        }),
    ))
}

/// Mint a new access token from the refresh cookie.
/// The refresh token itself is left untouched.
async fn refresh_token(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let access = state.refresher.refresh(refresh_token_from(&headers))?;

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, access_cookie(&access.token, state.secure_cookies))],
        Json(TokenResponse {
            status: StatusCode::OK.as_u16(),
            expires_in: access.ttl_secs(),
            access_token: access.token,
        }),
    ))
}

/// End the session by expiring both cookies on the client.
async fn logout(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    state.sessions.logout(access_token_from(&headers))?;

    Ok((
        StatusCode::OK,
        AppendHeaders([
            (
                SET_COOKIE,
                expired_cookie(ACCESS_COOKIE_NAME, state.secure_cookies),
            ),
            (
                SET_COOKIE,
                expired_cookie(REFRESH_COOKIE_NAME, state.secure_cookies),
            ),
        ]),
        Json(MessageResponse {
            status: StatusCode::OK.as_u16(),
            message: "Logged out",
        }),
    ))
}

/// Lightweight endpoint for checking auth status.
async fn verify(Authenticated(claims): Authenticated) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        status: StatusCode::OK.as_u16(),
        subject: claims.sub,
        expires_at: claims.exp,
    })
}
