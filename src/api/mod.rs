mod auth;
mod comments;
mod error;
mod movies;
mod response;
mod theaters;

use axum::Router;

use crate::auth::AuthState;
use crate::db::Database;

pub use error::ApiError;

/// Create the API router. Authentication is enforced by the access gate
/// layered around it in `create_app`.
pub fn create_api_router(db: Database, auth: AuthState) -> Router {
    let movies_state = movies::MoviesState { db: db.clone() };
    let comments_state = comments::CommentsState { db: db.clone() };
    let theaters_state = theaters::TheatersState { db };

    Router::new()
        .nest("/auth", auth::router(auth))
        .nest("/movies/comments", comments::router(comments_state))
        .nest("/movies/theaters", theaters::router(theaters_state))
        .nest("/movies", movies::router(movies_state))
}
