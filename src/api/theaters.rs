//! Theater records.
//!
//! - GET `/` - List theaters
//! - POST `/` - Create a theater
//! - GET/PUT/DELETE `/{id}` - Read, update or delete one theater

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::info;

use super::error::{ApiError, ResultExt, validate_id};
use super::response::{data, written};
use crate::auth::Authenticated;
use crate::db::Database;

const COLLECTION: &str = "theaters";
const LIST_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct TheatersState {
    pub db: Database,
}

pub fn router(state: TheatersState) -> Router {
    Router::new()
        .route("/", get(list_theaters).post(create_theater))
        .route(
            "/{id}",
            get(get_theater).put(update_theater).delete(delete_theater),
        )
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TheaterRequest {
    theater_id: Option<i64>,
    location: Option<LocationInput>,
}

#[derive(Deserialize)]
struct LocationInput {
    address: Option<Address>,
    geo: Option<GeoInput>,
}

#[derive(Deserialize, Serialize)]
struct Address {
    street1: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zipcode: Option<String>,
}

#[derive(Deserialize)]
struct GeoInput {
    #[serde(default)]
    coordinates: Vec<f64>,
}

impl LocationInput {
    /// Location document with the geo part stored as a GeoJSON point.
    fn into_document(self) -> Result<Value, ApiError> {
        let (Some(address), Some(geo)) = (self.address, self.geo) else {
            return Err(ApiError::missing_fields());
        };
        Ok(json!({
            "address": address,
            "geo": {
                "type": "Point",
                "coordinates": geo.coordinates,
            },
        }))
    }
}

async fn list_theaters(State(state): State<TheatersState>) -> Result<impl IntoResponse, ApiError> {
    let theaters = state
        .db
        .documents()
        .list(COLLECTION, LIST_LIMIT)
        .await
        .db_err("Failed to list theaters")?;

    Ok(data(
        theaters.into_iter().map(|t| t.into_json()).collect::<Vec<_>>(),
    ))
}

async fn create_theater(
    State(state): State<TheatersState>,
    Authenticated(claims): Authenticated,
    payload: Result<Json<TheaterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let (Some(theater_id), Some(location)) = (request.theater_id, request.location) else {
        return Err(ApiError::missing_fields());
    };

    let mut document = Map::new();
    document.insert("theaterId".into(), json!(theater_id));
    document.insert("location".into(), location.into_document()?);

    let id = state
        .db
        .documents()
        .insert(COLLECTION, document)
        .await
        .db_err("Failed to create theater")?;

    info!(subject = %claims.sub, theater_id = %id, "Theater created");
    Ok(written(
        StatusCode::CREATED,
        "Theater created",
        "theaterId",
        &id,
    ))
}

async fn get_theater(
    State(state): State<TheatersState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_id(&id, "theater")?;

    let theater = state
        .db
        .documents()
        .get(COLLECTION, &id)
        .await
        .db_err("Failed to get theater")?
        .ok_or_else(|| ApiError::not_found("Theater not found"))?;

    Ok(data(json!({ "theater": theater.into_json() })))
}

async fn update_theater(
    State(state): State<TheatersState>,
    Path(id): Path<String>,
    payload: Result<Json<TheaterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    validate_id(&id, "theater")?;
    let Json(request) = payload?;
    let location = request.location.ok_or_else(ApiError::missing_fields)?;

    let mut changes = Map::new();
    changes.insert("location".into(), location.into_document()?);
    if let Some(theater_id) = request.theater_id {
        changes.insert("theaterId".into(), json!(theater_id));
    }

    let updated = state
        .db
        .documents()
        .update(COLLECTION, &id, &changes)
        .await
        .db_err("Failed to update theater")?;

    if !updated {
        return Err(ApiError::not_found("Theater not found"));
    }

    Ok(written(StatusCode::OK, "Theater updated", "theaterId", &id))
}

async fn delete_theater(
    State(state): State<TheatersState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_id(&id, "theater")?;

    let deleted = state
        .db
        .documents()
        .delete(COLLECTION, &id)
        .await
        .db_err("Failed to delete theater")?;

    if !deleted {
        return Err(ApiError::not_found("Theater not found"));
    }

    Ok(written(StatusCode::OK, "Theater deleted", "theaterId", &id))
}
