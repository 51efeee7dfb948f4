mod api;
mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tokio::net::TcpListener;

use crate::{
    cli::Args,
    core::{registry::Paths, session::SessionHandle},
    error::{AppError, AppResult},
};

/// Shared state for the HTTP adapter: the database worker handle plus the
/// storage layout the upload handler writes into.
pub struct AppState {
    pub session: SessionHandle,
    pub paths: Paths,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/query", post(handlers::run_query))
        .route("/api/tables", get(handlers::list_tables))
        .route("/api/tables/{table}/rows", get(handlers::browse_table))
        .route("/api/upload", post(handlers::upload_file))
        .route(
            "/api/databases",
            get(handlers::list_databases).delete(handlers::delete_database),
        )
        .route("/api/databases/switch", post(handlers::switch_database))
        .layer(Extension(state))
}

pub async fn run(args: Args) -> AppResult<()> {
    let paths = Paths::new(args.db.clone(), args.uploads_dir.clone());
    std::fs::create_dir_all(&paths.uploads_dir)?;

    let session = SessionHandle::spawn(paths.clone(), !args.no_seed)?;
    let app = router(Arc::new(AppState { session, paths }));

    tracing::info!(addr = %args.listen, db = %args.db.display(), "sqlite-browser listening");
    let listener = TcpListener::bind(args.listen).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!("sqlite-browser shut down");
    Ok(())
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => {
                tracing::error!("failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, shutting down"); }
        () = terminate => { tracing::info!("received SIGTERM, shutting down"); }
    }
}
