//! Schemaless JSON document storage, addressed by collection and id.

use serde_json::{Map, Value};
use sqlx::sqlite::SqlitePool;

/// Field under which a document's id is exposed in its JSON form.
pub const ID_FIELD: &str = "_id";

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Map<String, Value>,
}

impl Document {
    /// The document body with its id merged in as `_id`.
    pub fn into_json(self) -> Value {
        let mut body = self.body;
        body.insert(ID_FIELD.to_string(), Value::String(self.id));
        Value::Object(body)
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    body: String,
}

impl TryFrom<DocumentRow> for Document {
    type Error = sqlx::Error;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            body: parse_body(&row.body)?,
        })
    }
}

fn parse_body(body: &str) -> Result<Map<String, Value>, sqlx::Error> {
    serde_json::from_str(body).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn encode_body(body: &Map<String, Value>) -> Result<String, sqlx::Error> {
    serde_json::to_string(body).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

#[derive(Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List up to `limit` documents of a collection in insertion order.
    pub async fn list(&self, collection: &str, limit: i64) -> Result<Vec<Document>, sqlx::Error> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT id, body FROM documents WHERE collection = ? ORDER BY rowid LIMIT ?",
        )
        .bind(collection)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Document::try_from).collect()
    }

    /// List up to `limit` documents whose top-level `field` equals `value`.
    pub async fn list_where(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        limit: i64,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT id, body FROM documents WHERE collection = ? AND json_extract(body, ?) = ? ORDER BY rowid LIMIT ?",
        )
        .bind(collection)
        .bind(format!("$.{}", field))
        .bind(value)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Document::try_from).collect()
    }

    /// Get a document by id.
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, sqlx::Error> {
        let row: Option<DocumentRow> =
            sqlx::query_as("SELECT id, body FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Document::try_from).transpose()
    }

    /// Insert a new document and return its generated id.
    pub async fn insert(
        &self,
        collection: &str,
        mut body: Map<String, Value>,
    ) -> Result<String, sqlx::Error> {
        body.remove(ID_FIELD);
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO documents (id, collection, body) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(collection)
            .bind(encode_body(&body)?)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    /// Merge `changes` into the top level of a document. Null values and
    /// `_id` are ignored. Returns false if no document matched.
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: &Map<String, Value>,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((body,)) = row else {
            return Ok(false);
        };

        let mut body = parse_body(&body)?;
        for (key, value) in changes {
            if key == ID_FIELD || value.is_null() {
                continue;
            }
            body.insert(key.clone(), value.clone());
        }

        sqlx::query(
            "UPDATE documents SET body = ?, updated_at = datetime('now') WHERE collection = ? AND id = ?",
        )
        .bind(encode_body(&body)?)
        .bind(collection)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Delete a document. Returns false if no document matched.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
