use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::AppError;

/// Request body for `POST /api/query`.
#[derive(Debug, Deserialize)]
pub struct QueryPayload {
    #[serde(default)]
    pub query: String,
}

/// Request body for `POST /api/databases/switch`.
#[derive(Debug, Deserialize)]
pub struct SwitchPayload {
    #[serde(default)]
    pub name: String,
}

/// Query string for `DELETE /api/databases?name=X`.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub name: String,
}

/// Query string for `GET /api/tables/{table}/rows`.
#[derive(Debug, Deserialize)]
pub struct BrowseParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Core errors mapped onto the HTTP boundary.
///
/// `/api/query` and browse report JSON `{error}` bodies; the file-management
/// endpoints report plain text. Import failures get a 500 regardless of the
/// underlying error kind.
#[derive(Debug)]
pub enum ApiError {
    Json(AppError),
    Text(AppError),
    ImportFailed(AppError),
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::InvalidRequest(_)
        | AppError::DefaultDbProtected
        | AppError::SqlError(_)
        | AppError::Json(_) => StatusCode::BAD_REQUEST,
        AppError::PathNotAllowed(_) => StatusCode::FORBIDDEN,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::DbOpenFailed { .. } | AppError::Io(_) | AppError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Json(err) => {
                let body = Json(serde_json::json!({ "error": err.to_string() }));
                (status_for(&err), body).into_response()
            }
            ApiError::Text(err) => (status_for(&err), err.to_string()).into_response(),
            ApiError::ImportFailed(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error executing SQL: {err}"),
            )
                .into_response(),
        }
    }
}
