//! Success bodies shared by the record endpoints.

use axum::{Json, http::StatusCode};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
pub struct DataResponse<T> {
    status: u16,
    data: T,
}

#[derive(Serialize)]
pub struct WriteResponse {
    status: u16,
    message: &'static str,
    data: Value,
}

/// `200 {"status": 200, "data": ...}`
pub fn data<T: Serialize>(data: T) -> (StatusCode, Json<DataResponse<T>>) {
    (
        StatusCode::OK,
        Json(DataResponse {
            status: StatusCode::OK.as_u16(),
            data,
        }),
    )
}

/// `{"status", "message", "data": {<id_key>: id}}` for create/update/delete.
pub fn written(
    status: StatusCode,
    message: &'static str,
    id_key: &str,
    id: &str,
) -> (StatusCode, Json<WriteResponse>) {
    let mut data = serde_json::Map::new();
    data.insert(id_key.to_string(), json!(id));
    (
        status,
        Json(WriteResponse {
            status: status.as_u16(),
            message,
            data: Value::Object(data),
        }),
    )
}
