use std::{
    path::{Path, PathBuf},
    thread,
};

use rusqlite::{Connection, OpenFlags};
use tokio::sync::oneshot;

use crate::core::types::{BrowsePage, BrowseRequest, DatabaseFile, QueryOutcome, TableSchema};
use crate::core::{browse, query, registry, registry::Paths, schema, seed};
use crate::error::{AppError, AppResult};

/// Handle to the dedicated database worker.
///
/// The worker thread owns the single live connection together with the path
/// it was opened from. Every statement, introspection, browse, listing,
/// switch and delete runs as a task on its queue, so the active handle is
/// never touched from two places at once and there is never more than one
/// live handle.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: std::sync::mpsc::Sender<SessionTask>,
}

impl SessionHandle {
    /// Spawns the worker against the default database, creating and (unless
    /// `seed_demo` is false) seeding it. Blocks until the database is open.
    pub fn spawn(paths: Paths, seed_demo: bool) -> AppResult<Self> {
        let (tx, rx) = std::sync::mpsc::channel::<SessionTask>();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<AppResult<()>>();
        thread::spawn(move || session_worker_main(paths, seed_demo, rx, ready_tx));

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { tx }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AppError::Internal("db worker failed to start".into())),
        }
    }

    pub async fn execute(&self, sql: String) -> AppResult<QueryOutcome> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(SessionTask::Execute { sql, respond_to: tx })
            .map_err(|_| AppError::Internal("db worker unavailable".into()))?;
        rx.await
            .map_err(|_| AppError::Internal("db worker dropped response".into()))?
    }

    pub async fn schema(&self) -> AppResult<TableSchema> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(SessionTask::Schema { respond_to: tx })
            .map_err(|_| AppError::Internal("db worker unavailable".into()))?;
        rx.await
            .map_err(|_| AppError::Internal("db worker dropped response".into()))?
    }

    pub async fn browse(&self, request: BrowseRequest) -> AppResult<BrowsePage> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(SessionTask::Browse {
                request,
                respond_to: tx,
            })
            .map_err(|_| AppError::Internal("db worker unavailable".into()))?;
        rx.await
            .map_err(|_| AppError::Internal("db worker dropped response".into()))?
    }

    pub async fn list_databases(&self) -> AppResult<Vec<DatabaseFile>> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(SessionTask::List { respond_to: tx })
            .map_err(|_| AppError::Internal("db worker unavailable".into()))?;
        rx.await
            .map_err(|_| AppError::Internal("db worker dropped response".into()))?
    }

    /// Switches the active database to `name`. Returns the name back for the
    /// confirmation body.
    pub async fn switch_to(&self, name: String) -> AppResult<String> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(SessionTask::Switch { name, respond_to: tx })
            .map_err(|_| AppError::Internal("db worker unavailable".into()))?;
        rx.await
            .map_err(|_| AppError::Internal("db worker dropped response".into()))?
    }

    pub async fn delete_database(&self, name: String) -> AppResult<()> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(SessionTask::Delete { name, respond_to: tx })
            .map_err(|_| AppError::Internal("db worker unavailable".into()))?;
        rx.await
            .map_err(|_| AppError::Internal("db worker dropped response".into()))?
    }
}

enum SessionTask {
    Execute {
        sql: String,
        respond_to: oneshot::Sender<AppResult<QueryOutcome>>,
    },
    Schema {
        respond_to: oneshot::Sender<AppResult<TableSchema>>,
    },
    Browse {
        request: BrowseRequest,
        respond_to: oneshot::Sender<AppResult<BrowsePage>>,
    },
    List {
        respond_to: oneshot::Sender<AppResult<Vec<DatabaseFile>>>,
    },
    Switch {
        name: String,
        respond_to: oneshot::Sender<AppResult<String>>,
    },
    Delete {
        name: String,
        respond_to: oneshot::Sender<AppResult<()>>,
    },
}

fn session_worker_main(
    paths: Paths,
    seed_demo: bool,
    rx: std::sync::mpsc::Receiver<SessionTask>,
    ready: std::sync::mpsc::Sender<AppResult<()>>,
) {
    let mut conn = match open_db(&paths.default_db) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, path = %paths.default_db.display(), "failed to open default database");
            let _ = ready.send(Err(e));
            return;
        }
    };
    if seed_demo {
        if let Err(e) = seed::seed_demo(&conn) {
            tracing::warn!(error = %e, "failed to seed default database");
        }
    }
    let mut active_path = paths.default_db.clone();
    let _ = ready.send(Ok(()));

    while let Ok(task) = rx.recv() {
        match task {
            SessionTask::Execute { sql, respond_to } => {
                let _ = respond_to.send(query::execute(&conn, &sql));
            }
            SessionTask::Schema { respond_to } => {
                let _ = respond_to.send(schema::snapshot(&conn));
            }
            SessionTask::Browse { request, respond_to } => {
                let _ = respond_to.send(browse::run(&conn, &request));
            }
            SessionTask::List { respond_to } => {
                let _ = respond_to.send(registry::list_databases(&paths, &active_path));
            }
            SessionTask::Switch { name, respond_to } => {
                let _ = respond_to.send(switch_active(&mut conn, &mut active_path, &name));
            }
            SessionTask::Delete { name, respond_to } => {
                let _ = respond_to.send(delete_database(&paths, &mut conn, &mut active_path, &name));
            }
        }
    }
}

/// Replaces the live handle with one opened on `target`, even when the
/// target is already active; there is no short-circuit.
fn switch_active(conn: &mut Connection, active: &mut PathBuf, name: &str) -> AppResult<String> {
    let target = PathBuf::from(name);
    if !target.is_file() {
        return Err(AppError::NotFound(target));
    }

    *conn = open_db(&target)?;
    *active = target;
    tracing::info!(path = %active.display(), "switched active database");
    Ok(name.to_string())
}

/// Removes a non-default database file; if it was the active one, the
/// session reverts to the default database.
fn delete_database(
    paths: &Paths,
    conn: &mut Connection,
    active: &mut PathBuf,
    name: &str,
) -> AppResult<()> {
    let target = registry::validate_delete_target(paths, name)?;
    std::fs::remove_file(&target)?;

    if *active == target {
        *conn = open_db(&paths.default_db)?;
        *active = paths.default_db.clone();
        tracing::info!(deleted = %target.display(), "active database deleted, reverted to default");
    } else {
        tracing::info!(deleted = %target.display(), "database deleted");
    }
    Ok(())
}

fn open_db(path: &Path) -> AppResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
    Connection::open_with_flags(path, flags).map_err(|source| AppError::DbOpenFailed {
        path: path.to_path_buf(),
        source,
    })
}
