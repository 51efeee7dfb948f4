use std::{
    fs,
    path::{Component, Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use rusqlite::Connection;

use crate::core::{dialect, query};
use crate::core::types::DatabaseFile;
use crate::error::{AppError, AppResult};

/// Filesystem layout the registry operates over: one default database file
/// plus an uploads directory holding every other database.
#[derive(Debug, Clone)]
pub struct Paths {
    pub default_db: PathBuf,
    pub uploads_dir: PathBuf,
}

impl Paths {
    pub fn new(default_db: PathBuf, uploads_dir: PathBuf) -> Self {
        Self {
            default_db,
            uploads_dir,
        }
    }

    pub fn is_default(&self, path: &Path) -> bool {
        path == self.default_db
    }
}

/// Enumerates known database files, default entry always first, each flagged
/// `current` by comparing its path with the active session path.
pub fn list_databases(paths: &Paths, active: &Path) -> AppResult<Vec<DatabaseFile>> {
    let mut files = vec![DatabaseFile {
        name: paths.default_db.display().to_string(),
        path: None,
        current: paths.is_default(active),
    }];

    let entries = match fs::read_dir(&paths.uploads_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(files),
        Err(err) => return Err(err.into()),
    };

    let mut uploads = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_db_file = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("sqlite") | Some("db")
        );
        if is_db_file && path.is_file() {
            uploads.push(path);
        }
    }
    uploads.sort();

    for path in uploads {
        files.push(DatabaseFile {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            current: active == path,
            path: Some(path.display().to_string()),
        });
    }
    Ok(files)
}

/// Validates a delete target: never the default database, must live under
/// the uploads directory without escaping it, and must exist.
pub fn validate_delete_target(paths: &Paths, name: &str) -> AppResult<PathBuf> {
    let target = PathBuf::from(name);
    if name.is_empty() || paths.is_default(&target) {
        return Err(AppError::DefaultDbProtected);
    }
    let escapes = target
        .components()
        .any(|c| matches!(c, Component::ParentDir));
    if escapes || !target.starts_with(&paths.uploads_dir) {
        return Err(AppError::PathNotAllowed(target));
    }
    if !target.is_file() {
        return Err(AppError::NotFound(target));
    }
    Ok(target)
}

/// Converts a foreign `.sql` dump and executes it into a brand-new database
/// file under the uploads directory. Returns the new file's name.
pub fn import_sql_dump(paths: &Paths, file_name: &str, dump: &str) -> AppResult<String> {
    fs::create_dir_all(&paths.uploads_dir)?;
    let script = dialect::convert(dump);

    let stem = file_name.strip_suffix(".sql").unwrap_or(file_name);
    let new_name = format!("{stem}-{}.sqlite", epoch_millis());
    let new_path = paths.uploads_dir.join(&new_name);

    let conn = Connection::open(&new_path).map_err(|source| AppError::DbOpenFailed {
        path: new_path.clone(),
        source,
    })?;
    if let Err(err) = query::run_script(&conn, &script) {
        drop(conn);
        // Half-imported files would show up in listings; remove the stub.
        let _ = fs::remove_file(&new_path);
        return Err(err);
    }

    tracing::info!(file = %new_name, "imported sql dump");
    Ok(new_name)
}

/// Stores an uploaded `.sqlite`/`.db` file unmodified under the uploads
/// directory. Returns the stored file's name.
pub fn store_database(paths: &Paths, file_name: &str, bytes: &[u8]) -> AppResult<String> {
    fs::create_dir_all(&paths.uploads_dir)?;
    let new_name = timestamped_name(file_name);
    fs::write(paths.uploads_dir.join(&new_name), bytes)?;
    tracing::info!(file = %new_name, size = bytes.len(), "stored uploaded database");
    Ok(new_name)
}

/// Disambiguates an upload name with a creation timestamp, keeping the
/// extension last so the file stays listable.
fn timestamped_name(file_name: &str) -> String {
    let millis = epoch_millis();
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}-{millis}.{ext}"),
        None => format!("{file_name}-{millis}"),
    }
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_paths(dir: &TempDir) -> Paths {
        Paths::new(dir.path().join("demo.sqlite"), dir.path().join("uploads"))
    }

    #[test]
    fn default_entry_is_first_even_without_uploads_dir() {
        let dir = TempDir::new().expect("tempdir");
        let paths = test_paths(&dir);
        let files = list_databases(&paths, &paths.default_db).expect("list");
        assert_eq!(files.len(), 1);
        assert!(files[0].current);
        assert!(files[0].path.is_none());
    }

    #[test]
    fn uploads_are_listed_and_flagged_current() {
        let dir = TempDir::new().expect("tempdir");
        let paths = test_paths(&dir);
        fs::create_dir_all(&paths.uploads_dir).expect("mkdir");
        let upload = paths.uploads_dir.join("extra.sqlite");
        fs::write(&upload, b"").expect("touch");
        fs::write(paths.uploads_dir.join("notes.txt"), b"").expect("touch");

        let files = list_databases(&paths, &upload).expect("list");
        assert_eq!(files.len(), 2);
        assert!(!files[0].current);
        assert_eq!(files[1].name, "extra.sqlite");
        assert!(files[1].current);
        assert_eq!(files[1].path.as_deref(), Some(upload.display().to_string().as_str()));
    }

    #[test]
    fn deleting_the_default_database_is_always_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let paths = test_paths(&dir);
        let err = validate_delete_target(&paths, &paths.default_db.display().to_string())
            .unwrap_err();
        assert!(matches!(err, AppError::DefaultDbProtected));

        let err = validate_delete_target(&paths, "").unwrap_err();
        assert!(matches!(err, AppError::DefaultDbProtected));
    }

    #[test]
    fn paths_outside_the_uploads_dir_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let paths = test_paths(&dir);
        let outside = dir.path().join("other.sqlite");
        let err =
            validate_delete_target(&paths, &outside.display().to_string()).unwrap_err();
        assert!(matches!(err, AppError::PathNotAllowed(_)));

        let sneaky = paths.uploads_dir.join("../demo.sqlite");
        let err = validate_delete_target(&paths, &sneaky.display().to_string()).unwrap_err();
        assert!(matches!(err, AppError::PathNotAllowed(_)));
    }

    #[test]
    fn missing_delete_target_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let paths = test_paths(&dir);
        fs::create_dir_all(&paths.uploads_dir).expect("mkdir");
        let missing = paths.uploads_dir.join("gone.sqlite");
        let err =
            validate_delete_target(&paths, &missing.display().to_string()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn timestamped_names_keep_the_extension_last() {
        let name = timestamped_name("mydata.db");
        assert!(name.starts_with("mydata-"));
        assert!(name.ends_with(".db"));
    }

    #[test]
    fn imported_dump_lands_as_a_sqlite_file() {
        let dir = TempDir::new().expect("tempdir");
        let paths = test_paths(&dir);
        let name = import_sql_dump(
            &paths,
            "seed.sql",
            "CREATE TABLE seed_table (id int); INSERT INTO seed_table VALUES (1);",
        )
        .expect("import");
        assert!(name.starts_with("seed-"));
        assert!(name.ends_with(".sqlite"));
        assert!(paths.uploads_dir.join(&name).is_file());
    }

    #[test]
    fn failed_import_leaves_no_stub_file() {
        let dir = TempDir::new().expect("tempdir");
        let paths = test_paths(&dir);
        let err = import_sql_dump(&paths, "bad.sql", "NOT REALLY SQL AT ALL;").unwrap_err();
        assert!(matches!(err, AppError::SqlError(_)));

        let leftovers: Vec<_> = fs::read_dir(&paths.uploads_dir)
            .expect("read uploads")
            .collect();
        assert!(leftovers.is_empty());
    }
}
