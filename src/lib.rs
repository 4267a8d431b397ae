pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;

use api::create_api_router;
use auth::{API_PREFIX, AuthState, Principal, access_gate};
use axum::{Router, middleware};
use db::Database;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Document store (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// The single principal allowed to log in
    pub root: Principal,
    /// Whether to set Secure flag on cookies (true in production)
    pub secure_cookies: bool,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let auth = AuthState::new(
        &config.jwt_secret,
        config.root.clone(),
        config.secure_cookies,
    );

    Router::new()
        .nest(API_PREFIX, create_api_router(config.db.clone(), auth.clone()))
        .layer(middleware::from_fn_with_state(auth, access_gate))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}
