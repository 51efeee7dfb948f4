use rusqlite::{Connection, Row};

use crate::core::types::{ColumnInfo, TableSchema};
use crate::error::AppResult;

/// Lists user tables from the catalog, name-ordered, excluding SQLite
/// internals.
pub fn list_tables(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let rows = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Columns of `table` via `PRAGMA table_info`, in engine order.
///
/// A table that does not exist yields an empty vec, mirroring the PRAGMA's
/// own silent no-result. A name that is not a plain identifier is treated
/// the same way rather than being spliced into the PRAGMA text.
pub fn table_columns(conn: &Connection, table: &str) -> AppResult<Vec<ColumnInfo>> {
    if !is_plain_identifier(table) {
        return Ok(Vec::new());
    }

    let sql = format!("PRAGMA table_info({table})");
    let mut stmt = conn.prepare(&sql)?;
    let cols = stmt
        .query_map([], |row: &Row<'_>| {
            Ok(ColumnInfo {
                name: row.get("name")?,
                decl_type: row.get("type")?,
                not_null: row.get::<_, i64>("notnull")? != 0,
                is_pk: row.get::<_, i64>("pk")? != 0,
                default_value: row.get("dflt_value")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cols)
}

/// Fresh table-to-columns snapshot of the active database. Recomputed on
/// every call so it always reflects the database live at call time.
pub fn snapshot(conn: &Connection) -> AppResult<TableSchema> {
    let mut out = TableSchema::new();
    for table in list_tables(conn)? {
        let columns = table_columns(conn, &table)?;
        out.insert(table, columns);
    }
    Ok(out)
}

pub(crate) fn is_plain_identifier(s: &str) -> bool {
    // Minimal safe subset: [A-Za-z_][A-Za-z0-9_]*
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
