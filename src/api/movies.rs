//! Movie records.
//!
//! - GET `/` - List movies
//! - POST `/` - Create a movie
//! - GET/PUT/DELETE `/{id}` - Read, update or delete one movie

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::error::{ApiError, ResultExt, into_object, validate_id};
use super::response::{data, written};
use crate::auth::Authenticated;
use crate::db::Database;

const COLLECTION: &str = "movies";
const LIST_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct MoviesState {
    pub db: Database,
}

pub fn router(state: MoviesState) -> Router {
    Router::new()
        .route("/", get(list_movies).post(create_movie))
        .route(
            "/{id}",
            get(get_movie).put(update_movie).delete(delete_movie),
        )
        .with_state(state)
}

/// Movie fields as accepted on create and update. Absent fields serialize
/// as null, which the store skips on update.
#[derive(Deserialize, Serialize)]
struct MovieFields {
    title: Option<String>,
    plot: Option<String>,
    genres: Option<Vec<String>>,
    runtime: Option<i64>,
    cast: Option<Vec<String>>,
    poster: Option<String>,
    fullplot: Option<String>,
    languages: Option<Vec<String>>,
    released: Option<String>,
    directors: Option<Vec<String>>,
    rated: Option<String>,
    awards: Option<Value>,
    year: Option<i64>,
    imdb: Option<Value>,
    countries: Option<Vec<String>>,
    #[serde(rename = "type")]
    kind: Option<String>,
    tomatoes: Option<Value>,
    num_mflix_comments: Option<i64>,
}

impl MovieFields {
    /// Build a complete movie document, filling defaults for optional fields.
    fn into_new_document(self) -> Result<Value, ApiError> {
        let (Some(title), Some(plot), Some(genres), Some(runtime)) =
            (self.title, self.plot, self.genres, self.runtime)
        else {
            return Err(ApiError::missing_fields());
        };
        if title.is_empty() || plot.is_empty() || runtime <= 0 {
            return Err(ApiError::missing_fields());
        }

        let now = Utc::now();
        Ok(json!({
            "title": title,
            "plot": plot,
            "genres": genres,
            "runtime": runtime,
            "cast": self.cast.unwrap_or_default(),
            "poster": self.poster.unwrap_or_default(),
            "fullplot": self.fullplot.unwrap_or_default(),
            "languages": self.languages.unwrap_or_default(),
            "released": self.released.unwrap_or_else(|| now.to_rfc3339()),
            "directors": self.directors.unwrap_or_default(),
            "rated": self.rated.unwrap_or_default(),
            "awards": self.awards.unwrap_or_else(|| json!({})),
            "year": self.year.unwrap_or(i64::from(now.year())),
            "imdb": self.imdb.unwrap_or_else(|| json!({})),
            "countries": self.countries.unwrap_or_default(),
            "type": self.kind.unwrap_or_else(|| "movie".to_string()),
            "tomatoes": self.tomatoes.unwrap_or_else(|| json!({})),
            "num_mflix_comments": self.num_mflix_comments.unwrap_or(0),
        }))
    }
}

async fn list_movies(State(state): State<MoviesState>) -> Result<impl IntoResponse, ApiError> {
    let movies = state
        .db
        .documents()
        .list(COLLECTION, LIST_LIMIT)
        .await
        .db_err("Failed to list movies")?;

    Ok(data(
        movies.into_iter().map(|m| m.into_json()).collect::<Vec<_>>(),
    ))
}

async fn create_movie(
    State(state): State<MoviesState>,
    Authenticated(claims): Authenticated,
    payload: Result<Json<MovieFields>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(fields) = payload?;
    let document = into_object(fields.into_new_document()?)?;

    let id = state
        .db
        .documents()
        .insert(COLLECTION, document)
        .await
        .db_err("Failed to create movie")?;

    info!(subject = %claims.sub, movie_id = %id, "Movie created");
    Ok(written(StatusCode::CREATED, "Movie created", "movieId", &id))
}

async fn get_movie(
    State(state): State<MoviesState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_id(&id, "movie")?;

    let movie = state
        .db
        .documents()
        .get(COLLECTION, &id)
        .await
        .db_err("Failed to get movie")?
        .ok_or_else(|| ApiError::not_found("Movie not found"))?;

    Ok(data(json!({ "movie": movie.into_json() })))
}

async fn update_movie(
    State(state): State<MoviesState>,
    Path(id): Path<String>,
    payload: Result<Json<MovieFields>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    validate_id(&id, "movie")?;
    let Json(fields) = payload?;

    let changes = serde_json::to_value(fields)
        .map_err(|e| ApiError::db_error("Failed to encode movie update", e))
        .and_then(into_object)?;

    let updated = state
        .db
        .documents()
        .update(COLLECTION, &id, &changes)
        .await
        .db_err("Failed to update movie")?;

    if !updated {
        return Err(ApiError::not_found("Movie not found"));
    }

    Ok(written(StatusCode::OK, "Movie updated", "movieId", &id))
}

async fn delete_movie(
    State(state): State<MoviesState>,
    Authenticated(claims): Authenticated,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_id(&id, "movie")?;

    let deleted = state
        .db
        .documents()
        .delete(COLLECTION, &id)
        .await
        .db_err("Failed to delete movie")?;

    if !deleted {
        return Err(ApiError::not_found("Movie not found"));
    }

    info!(subject = %claims.sub, movie_id = %id, "Movie deleted");
    Ok(written(StatusCode::OK, "Movie deleted", "movieId", &id))
}
