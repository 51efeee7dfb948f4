use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cannot delete default database")]
    DefaultDbProtected,

    #[error("path not allowed: {}", .0.display())]
    PathNotAllowed(PathBuf),

    #[error("database not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to open database: {}: {source}", .path.display())]
    DbOpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    // Engine message passed through verbatim; callers see exactly what
    // SQLite said about the statement.
    #[error("{0}")]
    SqlError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::SqlError(e.to_string())
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::DefaultDbProtected => "DEFAULT_DB_PROTECTED",
            AppError::PathNotAllowed(_) => "PATH_NOT_ALLOWED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DbOpenFailed { .. } => "DB_OPEN_FAILED",
            AppError::SqlError(_) => "SQL_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Json(_) => "JSON_ERROR",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
