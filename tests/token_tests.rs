//! Tests for the access gate and the session token endpoints.
//!
//! Tests cover:
//! - Access token checks on protected routes (cookie and Bearer header)
//! - Transparent renewal from the refresh cookie when the access token is stale
//! - The refresh-token endpoint
//! - Logout and the verify endpoint

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use cinegate::jwt::{
    ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS, TokenKind, unix_now,
};
use common::{
    access_cookie_only, auth_cookies, body_json, codec, cookie_value, create_test_app,
    empty_request, extract_set_cookies, has_cleared_cookie, login, refresh_cookie_only, send,
};

/// Access token for root that expired `secs_ago` seconds ago.
fn expired_access(secs_ago: u64) -> String {
    let now = unix_now().unwrap();
    codec()
        .issue_at(
            "root",
            TokenKind::Access,
            ACCESS_TOKEN_TTL_SECS,
            now - ACCESS_TOKEN_TTL_SECS - secs_ago,
        )
        .unwrap()
        .token
}

fn expired_refresh() -> String {
    let now = unix_now().unwrap();
    codec()
        .issue_at(
            "root",
            TokenKind::Refresh,
            REFRESH_TOKEN_TTL_SECS,
            now - REFRESH_TOKEN_TTL_SECS - 10,
        )
        .unwrap()
        .token
}

// =============================================================================
// Access Gate Tests
// =============================================================================

#[tokio::test]
async fn test_valid_access_token_authenticates() {
    let (app, _) = create_test_app().await;
    let (access, _) = login(&app).await;

    let response = send(
        &app,
        empty_request("GET", "/api/movies", Some(&access_cookie_only(&access))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(extract_set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_no_tokens_returns_unauthorized() {
    let (app, _) = create_test_app().await;

    let response = send(&app, empty_request("GET", "/api/movies", None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["status"], 401);
    assert_eq!(json["message"], "Unauthorized: Missing access token");
}

#[tokio::test]
async fn test_refresh_cookie_alone_is_not_enough() {
    let (app, _) = create_test_app().await;
    let (_, refresh) = login(&app).await;

    let response = send(
        &app,
        empty_request("GET", "/api/movies", Some(&refresh_cookie_only(&refresh))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_header_accepted() {
    let (app, _) = create_test_app().await;
    let (access, _) = login(&app).await;

    let response = send(
        &app,
        Request::builder()
            .uri("/api/movies")
            .header("authorization", format!("Bearer {}", access))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_expired_access_token_is_renewed() {
    let (app, _) = create_test_app().await;
    let (_, refresh) = login(&app).await;
    let stale = expired_access(1);

    let response = send(
        &app,
        empty_request("GET", "/api/movies", Some(&auth_cookies(&stale, &refresh))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let cookies = extract_set_cookies(&response);
    let renewed = cookie_value(&cookies, "accessToken").expect("renewed access cookie");
    assert_ne!(renewed, stale);
    assert!(cookies.iter().any(|c| c.contains("Max-Age=900")));
    assert!(cookie_value(&cookies, "refreshToken").is_none());

    let claims = codec().verify_kind(&renewed, TokenKind::Access).unwrap();
    assert_eq!(claims.sub, "root");
}

#[tokio::test]
async fn test_renewed_claims_reach_the_handler() {
    let (app, _) = create_test_app().await;
    let (_, refresh) = login(&app).await;

    let response = send(
        &app,
        empty_request(
            "GET",
            "/api/auth/verify",
            Some(&auth_cookies(&expired_access(60), &refresh)),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let renewed = cookie_value(&extract_set_cookies(&response), "accessToken").unwrap();
    let claims = codec().verify(&renewed).unwrap();

    let json = body_json(response).await;
    assert_eq!(json["subject"], "root");
    assert_eq!(json["expiresAt"], claims.exp);
}

#[tokio::test]
async fn test_forged_access_token_is_renewed() {
    let (app, _) = create_test_app().await;
    let (_, refresh) = login(&app).await;
    let forged = cinegate::jwt::TokenCodec::new(b"some-other-secret-0123456789abcdef")
        .issue("root", TokenKind::Access, ACCESS_TOKEN_TTL_SECS)
        .unwrap()
        .token;

    let response = send(
        &app,
        empty_request("GET", "/api/movies", Some(&auth_cookies(&forged, &refresh))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(cookie_value(&extract_set_cookies(&response), "accessToken").is_some());
}

#[tokio::test]
async fn test_expired_access_without_refresh_rejected() {
    let (app, _) = create_test_app().await;

    let response = send(
        &app,
        empty_request(
            "GET",
            "/api/movies",
            Some(&access_cookie_only(&expired_access(1))),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Unauthorized: Missing refresh token");
}

#[tokio::test]
async fn test_both_tokens_expired_rejected() {
    let (app, _) = create_test_app().await;

    let response = send(
        &app,
        empty_request(
            "GET",
            "/api/movies",
            Some(&auth_cookies(&expired_access(1), &expired_refresh())),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(extract_set_cookies(&response).is_empty());

    let json = body_json(response).await;
    assert_eq!(json["message"], "Unauthorized: Invalid or expired token");
}

#[tokio::test]
async fn test_refresh_token_in_access_slot_rejected() {
    let (app, _) = create_test_app().await;
    let (_, refresh) = login(&app).await;

    let response = send(
        &app,
        empty_request("GET", "/api/movies", Some(&access_cookie_only(&refresh))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_in_refresh_slot_rejected() {
    let (app, _) = create_test_app().await;
    let (access, _) = login(&app).await;

    let response = send(
        &app,
        empty_request(
            "GET",
            "/api/movies",
            Some(&auth_cookies(&expired_access(1), &access)),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_paths_outside_api_are_not_gated() {
    let (app, _) = create_test_app().await;

    let response = send(&app, empty_request("GET", "/index.html", None)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Refresh Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_refresh_endpoint_issues_access_token() {
    let (app, _) = create_test_app().await;
    let (access, refresh) = login(&app).await;

    let response = send(
        &app,
        empty_request(
            "POST",
            "/api/auth/refresh-token",
            Some(&refresh_cookie_only(&refresh)),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let cookies = extract_set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    let renewed = cookie_value(&cookies, "accessToken").unwrap();
    assert_ne!(renewed, access);

    let json = body_json(response).await;
    assert_eq!(json["status"], 200);
    assert_eq!(json["accessToken"], renewed.as_str());
    assert_eq!(json["expiresIn"], 900);
}

#[tokio::test]
async fn test_refresh_endpoint_can_be_used_repeatedly() {
    let (app, _) = create_test_app().await;
    let (_, refresh) = login(&app).await;

    let mut tokens = Vec::new();
    for _ in 0..2 {
        let response = send(
            &app,
            empty_request(
                "POST",
                "/api/auth/refresh-token",
                Some(&refresh_cookie_only(&refresh)),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        tokens.push(cookie_value(&extract_set_cookies(&response), "accessToken").unwrap());
    }

    assert_ne!(tokens[0], tokens[1]);
}

#[tokio::test]
async fn test_refresh_endpoint_without_cookie() {
    let (app, _) = create_test_app().await;

    let response = send(&app, empty_request("POST", "/api/auth/refresh-token", None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Unauthorized: Missing refresh token");
}

#[tokio::test]
async fn test_refresh_endpoint_rejects_access_token() {
    let (app, _) = create_test_app().await;
    let (access, _) = login(&app).await;

    let response = send(
        &app,
        empty_request(
            "POST",
            "/api/auth/refresh-token",
            Some(&refresh_cookie_only(&access)),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_endpoint_rejects_expired_refresh() {
    let (app, _) = create_test_app().await;

    let response = send(
        &app,
        empty_request(
            "POST",
            "/api/auth/refresh-token",
            Some(&refresh_cookie_only(&expired_refresh())),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Logout and Verify Tests
// =============================================================================

#[tokio::test]
async fn test_logout_clears_both_cookies() {
    let (app, _) = create_test_app().await;
    let (access, refresh) = login(&app).await;

    let response = send(
        &app,
        empty_request(
            "DELETE",
            "/api/auth/logout",
            Some(&auth_cookies(&access, &refresh)),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let cookies = extract_set_cookies(&response);
    assert!(
        has_cleared_cookie(&cookies, "accessToken"),
        "Should clear accessToken cookie"
    );
    assert!(
        has_cleared_cookie(&cookies, "refreshToken"),
        "Should clear refreshToken cookie"
    );

    let json = body_json(response).await;
    assert_eq!(json["status"], 200);
    assert_eq!(json["message"], "Logged out");
}

#[tokio::test]
async fn test_logout_without_token_rejected() {
    let (app, _) = create_test_app().await;

    let response = send(&app, empty_request("DELETE", "/api/auth/logout", None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(extract_set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_tokens_remain_valid_after_logout() {
    let (app, _) = create_test_app().await;
    let (access, refresh) = login(&app).await;
    let cookie = auth_cookies(&access, &refresh);

    let response = send(&app, empty_request("DELETE", "/api/auth/logout", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, empty_request("GET", "/api/movies", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_verify_describes_access_token() {
    let (app, _) = create_test_app().await;
    let (access, _) = login(&app).await;
    let claims = codec().verify(&access).unwrap();

    let response = send(
        &app,
        empty_request("GET", "/api/auth/verify", Some(&access_cookie_only(&access))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], 200);
    assert_eq!(json["subject"], "root");
    assert_eq!(json["expiresAt"], claims.exp);
}
