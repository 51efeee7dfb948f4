use std::collections::HashMap;
use std::time::Instant;

use base64::Engine as _;
use rusqlite::{types::ValueRef, Connection, Row};

use crate::core::types::{DbRow, QueryOutcome};
use crate::error::{AppError, AppResult};

/// Runs one ad-hoc SQL statement against `conn`.
///
/// A statement starting with `select` (trimmed, case-insensitive) is run as a
/// read and returns every matching row; anything else is run as a write and
/// reports `changes` / `last_insert_id`. The reported duration covers the
/// engine call only, not request parsing.
pub fn execute(conn: &Connection, sql: &str) -> AppResult<QueryOutcome> {
    let sql = sql.trim();
    if sql.is_empty() {
        return Err(AppError::InvalidRequest("query is required".into()));
    }

    let start = Instant::now();
    if sql.to_lowercase().starts_with("select") {
        let rows = fetch_all(conn, sql)?;
        Ok(QueryOutcome::Rows {
            rows,
            duration_ms: ms_since(start),
        })
    } else {
        let changes = conn.execute(sql, [])? as u64;
        Ok(QueryOutcome::Exec {
            changes,
            last_insert_id: conn.last_insert_rowid(),
            duration_ms: ms_since(start),
        })
    }
}

/// Executes a multi-statement script, e.g. a converted dump.
pub fn run_script(conn: &Connection, script: &str) -> AppResult<()> {
    conn.execute_batch(script)?;
    Ok(())
}

fn fetch_all(conn: &Connection, sql: &str) -> AppResult<Vec<DbRow>> {
    let mut stmt = conn.prepare(sql)?;
    let col_names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

    let mut rows = Vec::new();
    let mut r = stmt.query([])?;
    while let Some(row) = r.next()? {
        rows.push(row_to_object(row, &col_names)?);
    }
    Ok(rows)
}

fn row_to_object(row: &Row<'_>, col_names: &[String]) -> AppResult<DbRow> {
    let mut out = HashMap::with_capacity(col_names.len());
    for (i, name) in col_names.iter().enumerate() {
        let v = match row.get_ref(i)? {
            ValueRef::Null => serde_json::Value::Null,
            ValueRef::Integer(x) => serde_json::Value::from(x),
            ValueRef::Real(x) => serde_json::Value::from(x),
            ValueRef::Text(t) => serde_json::Value::from(String::from_utf8_lossy(t).to_string()),
            ValueRef::Blob(b) => serde_json::json!({
                "$type": "blob",
                "base64": base64::engine::general_purpose::STANDARD.encode(b),
                "size": b.len(),
            }),
        };
        out.insert(name.clone(), v);
    }
    Ok(out)
}

fn ms_since(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1_000.0
}
