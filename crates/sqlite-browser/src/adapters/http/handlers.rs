use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Multipart, Path, Query},
    response::{IntoResponse, Response},
};

use crate::core::{
    registry,
    types::{BrowseRequest, QueryOutcome},
};
use crate::error::AppError;

use super::{
    api::{ApiError, BrowseParams, DeleteParams, QueryPayload, SwitchPayload},
    AppState,
};

/// Handler for `POST /api/query`: runs one ad-hoc statement against the
/// active database.
pub async fn run_query(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<QueryPayload>,
) -> Result<Response, ApiError> {
    let outcome = state
        .session
        .execute(payload.query)
        .await
        .map_err(ApiError::Json)?;
    Ok(query_response(outcome))
}

fn query_response(outcome: QueryOutcome) -> Response {
    let (results, duration) = match outcome {
        QueryOutcome::Rows { rows, duration_ms } => (serde_json::json!(rows), duration_ms),
        QueryOutcome::Exec {
            changes,
            last_insert_id,
            duration_ms,
        } => (
            serde_json::json!([{ "changes": changes, "lastInsertId": last_insert_id }]),
            duration_ms,
        ),
    };
    axum::Json(serde_json::json!({ "results": results, "duration": duration })).into_response()
}

/// Handler for `GET /api/tables`: table-to-columns snapshot of the active
/// database.
pub async fn list_tables(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let snapshot = state.session.schema().await.map_err(ApiError::Json)?;
    Ok(axum::Json(snapshot).into_response())
}

/// Handler for `GET /api/tables/{table}/rows?page=&page_size=&search=`:
/// one search-filtered page of a table. The page is clamped into the table's current
/// range here, before the builder sees it.
pub async fn browse_table(
    Extension(state): Extension<Arc<AppState>>,
    Path(table): Path<String>,
    Query(params): Query<BrowseParams>,
) -> Result<Response, ApiError> {
    let mut request = BrowseRequest {
        table,
        page: params.page.unwrap_or(0),
        page_size: params.page_size.unwrap_or(10).max(1),
        search: params.search.unwrap_or_default(),
    };

    let page = state
        .session
        .browse(request.clone())
        .await
        .map_err(ApiError::Json)?;
    if u64::from(request.page) < page.total_pages {
        return Ok(axum::Json(page).into_response());
    }

    request.page = u32::try_from(page.total_pages - 1).unwrap_or(u32::MAX);
    let clamped = state
        .session
        .browse(request)
        .await
        .map_err(ApiError::Json)?;
    Ok(axum::Json(clamped).into_response())
}

/// Handler for `POST /api/upload`: imports a `.sql` dump through the dialect
/// converter, or stores a raw `.sqlite`/`.db` file. The upload must arrive
/// in the multipart field named `file`; other fields are skipped.
pub async fn upload_file(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut upload: Option<(String, axum::body::Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Text(AppError::InvalidRequest(format!("multipart error: {e}"))))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await.map_err(|e| {
            ApiError::Text(AppError::InvalidRequest(format!("failed to read upload: {e}")))
        })?;
        upload = Some((file_name, data));
        break;
    }
    let (file_name, data) = upload
        .ok_or_else(|| ApiError::Text(AppError::InvalidRequest("No file uploaded".into())))?;

    let lower = file_name.to_lowercase();

    let paths = state.paths.clone();
    if lower.ends_with(".sql") {
        let text = String::from_utf8_lossy(&data).into_owned();
        let imported =
            tokio::task::spawn_blocking(move || registry::import_sql_dump(&paths, &file_name, &text))
                .await
                .map_err(|e| ApiError::Text(AppError::Internal(format!("task join error: {e}"))))?
                .map_err(ApiError::ImportFailed)?;
        Ok(format!("SQL imported successfully into {imported}").into_response())
    } else if lower.ends_with(".sqlite") || lower.ends_with(".db") {
        let stored =
            tokio::task::spawn_blocking(move || registry::store_database(&paths, &file_name, &data))
                .await
                .map_err(|e| ApiError::Text(AppError::Internal(format!("task join error: {e}"))))?
                .map_err(ApiError::Text)?;
        Ok(format!("Database uploaded: {stored}").into_response())
    } else {
        Err(ApiError::Text(AppError::InvalidRequest(
            "Invalid file type. Upload .sql, .sqlite, or .db".into(),
        )))
    }
}

/// Handler for `GET /api/databases`: known database files, default first.
pub async fn list_databases(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let files = state.session.list_databases().await.map_err(ApiError::Text)?;
    Ok(axum::Json(files).into_response())
}

/// Handler for `DELETE /api/databases?name=X`: removes a non-default database
/// file, reverting the session to the default database if it was active.
pub async fn delete_database(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<DeleteParams>,
) -> Result<Response, ApiError> {
    state
        .session
        .delete_database(params.name)
        .await
        .map_err(ApiError::Text)?;
    Ok("Deleted".into_response())
}

/// Handler for `POST /api/databases/switch`: binds the session to another
/// database file.
pub async fn switch_database(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<SwitchPayload>,
) -> Result<Response, ApiError> {
    if payload.name.is_empty() {
        return Err(ApiError::Text(AppError::InvalidRequest("Name required".into())));
    }
    let name = state
        .session
        .switch_to(payload.name)
        .await
        .map_err(ApiError::Text)?;
    Ok(format!("Switched to {name}").into_response())
}
