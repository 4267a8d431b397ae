//! Comments on movies.
//!
//! - GET `/` - List comments, optionally filtered by `?movie_id=`
//! - POST `/` - Create a comment
//! - GET/PUT/DELETE `/{id}` - Read, update or delete one comment

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::info;

use super::error::{ApiError, ResultExt, validate_id};
use super::response::{data, written};
use crate::auth::Authenticated;
use crate::db::Database;

const COLLECTION: &str = "comments";
const LIST_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct CommentsState {
    pub db: Database,
}

pub fn router(state: CommentsState) -> Router {
    Router::new()
        .route("/", get(list_comments).post(create_comment))
        .route(
            "/{id}",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
        .with_state(state)
}

#[derive(Deserialize)]
struct ListQuery {
    movie_id: Option<String>,
}

#[derive(Deserialize)]
struct CommentFields {
    name: Option<String>,
    email: Option<String>,
    movie_id: Option<String>,
    text: Option<String>,
    date: Option<String>,
}

/// Normalize an RFC 3339 date to UTC.
fn parse_date(date: &str) -> Result<String, ApiError> {
    DateTime::parse_from_rfc3339(date)
        .map(|d| d.with_timezone(&Utc).to_rfc3339())
        .map_err(|_| ApiError::bad_request("Invalid date"))
}

impl CommentFields {
    /// Validated document for a new comment; every field is required.
    fn into_new_document(self) -> Result<Map<String, Value>, ApiError> {
        let (Some(name), Some(email), Some(movie_id), Some(text), Some(date)) =
            (self.name, self.email, self.movie_id, self.text, self.date)
        else {
            return Err(ApiError::missing_fields());
        };
        if [&name, &email, &movie_id, &text, &date]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(ApiError::missing_fields());
        }
        validate_id(&movie_id, "movie")?;

        let mut document = Map::new();
        document.insert("name".into(), json!(name));
        document.insert("email".into(), json!(email));
        document.insert("movie_id".into(), json!(movie_id));
        document.insert("text".into(), json!(text));
        document.insert("date".into(), json!(parse_date(&date)?));
        Ok(document)
    }

    /// Validated changes for an existing comment; only provided fields.
    fn into_changes(self) -> Result<Map<String, Value>, ApiError> {
        let mut changes = Map::new();
        if let Some(movie_id) = self.movie_id {
            validate_id(&movie_id, "movie")?;
            changes.insert("movie_id".into(), json!(movie_id));
        }
        if let Some(date) = self.date {
            changes.insert("date".into(), json!(parse_date(&date)?));
        }
        for (key, value) in [("name", self.name), ("email", self.email), ("text", self.text)] {
            if let Some(value) = value {
                changes.insert(key.into(), json!(value));
            }
        }
        Ok(changes)
    }
}

async fn list_comments(
    State(state): State<CommentsState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.db.documents();
    let comments = match query.movie_id.as_deref() {
        Some(movie_id) => {
            validate_id(movie_id, "movie")?;
            store
                .list_where(COLLECTION, "movie_id", movie_id, LIST_LIMIT)
                .await
        }
        None => store.list(COLLECTION, LIST_LIMIT).await,
    }
    .db_err("Failed to list comments")?;

    Ok(data(
        comments.into_iter().map(|c| c.into_json()).collect::<Vec<_>>(),
    ))
}

async fn create_comment(
    State(state): State<CommentsState>,
    Authenticated(claims): Authenticated,
    payload: Result<Json<CommentFields>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(fields) = payload?;
    let document = fields.into_new_document()?;

    let id = state
        .db
        .documents()
        .insert(COLLECTION, document)
        .await
        .db_err("Failed to create comment")?;

    info!(subject = %claims.sub, comment_id = %id, "Comment created");
    Ok(written(
        StatusCode::CREATED,
        "Comment created",
        "commentId",
        &id,
    ))
}

async fn get_comment(
    State(state): State<CommentsState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_id(&id, "comment")?;

    let comment = state
        .db
        .documents()
        .get(COLLECTION, &id)
        .await
        .db_err("Failed to get comment")?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(data(json!({ "comment": comment.into_json() })))
}

async fn update_comment(
    State(state): State<CommentsState>,
    Path(id): Path<String>,
    payload: Result<Json<CommentFields>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    validate_id(&id, "comment")?;
    let Json(fields) = payload?;
    let changes = fields.into_changes()?;

    let updated = state
        .db
        .documents()
        .update(COLLECTION, &id, &changes)
        .await
        .db_err("Failed to update comment")?;

    if !updated {
        return Err(ApiError::not_found("Comment not found"));
    }

    Ok(written(StatusCode::OK, "Comment updated", "commentId", &id))
}

async fn delete_comment(
    State(state): State<CommentsState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_id(&id, "comment")?;

    let deleted = state
        .db
        .documents()
        .delete(COLLECTION, &id)
        .await
        .db_err("Failed to delete comment")?;

    if !deleted {
        return Err(ApiError::not_found("Comment not found"));
    }

    Ok(written(StatusCode::OK, "Comment deleted", "commentId", &id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_normalizes_to_utc() {
        assert_eq!(
            parse_date("2024-03-01T12:00:00+02:00").unwrap(),
            "2024-03-01T10:00:00+00:00"
        );
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_changes_only_include_provided_fields() {
        let fields = CommentFields {
            name: None,
            email: None,
            movie_id: None,
            text: Some("edited".into()),
            date: None,
        };
        let changes = fields.into_changes().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["text"], "edited");
    }
}
