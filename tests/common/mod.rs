#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
};
use cinegate::{ServerConfig, auth::Principal, create_app, db::Database, jwt::TokenCodec};
use tower::ServiceExt;

pub const JWT_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";
pub const ROOT_USER: &str = "root";
pub const ROOT_PASSWORD: &str = "rootpw";

/// Create a test app backed by an in-memory database.
pub async fn create_test_app() -> (axum::Router, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: JWT_SECRET.to_vec(),
        root: Principal::new(ROOT_USER, ROOT_PASSWORD),
        secure_cookies: false,
    };
    (create_app(&config), db)
}

/// Codec sharing the app's secret, for minting tokens at arbitrary times.
pub fn codec() -> TokenCodec {
    TokenCodec::new(JWT_SECRET)
}

/// Send a request through a clone of the app.
pub async fn send(app: &axum::Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Log in as root and return (access_token, refresh_token).
pub async fn login(app: &axum::Router) -> (String, String) {
    let body = format!(
        r#"{{"username": "{}", "password": "{}"}}"#,
        ROOT_USER, ROOT_PASSWORD
    );
    let response = send(app, json_request("POST", "/api/auth/login", None, &body)).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let cookies = extract_set_cookies(&response);
    let access = cookie_value(&cookies, "accessToken").expect("access cookie");
    let refresh = cookie_value(&cookies, "refreshToken").expect("refresh cookie");
    (access, refresh)
}

pub fn auth_cookies(access_token: &str, refresh_token: &str) -> String {
    format!(
        "accessToken={}; refreshToken={}",
        access_token, refresh_token
    )
}

pub fn access_cookie_only(access_token: &str) -> String {
    format!("accessToken={}", access_token)
}

pub fn refresh_cookie_only(refresh_token: &str) -> String {
    format!("refreshToken={}", refresh_token)
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Value of the named cookie among Set-Cookie headers, if it is being set.
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    cookies.iter().find_map(|c| {
        let value = c.strip_prefix(&prefix)?.split(';').next()?;
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Check if cookies contain a token being cleared (Max-Age=0)
pub fn has_cleared_cookie(cookies: &[String], cookie_name: &str) -> bool {
    cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=;", cookie_name)) && c.contains("Max-Age=0"))
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
