use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// One column of a table as reported by `PRAGMA table_info`, in engine order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(default)]
    pub decl_type: Option<String>,
    pub not_null: bool,
    pub is_pk: bool,
    #[serde(default)]
    pub default_value: Option<String>,
}

/// A result row: column name to dynamically typed value.
pub type DbRow = HashMap<String, serde_json::Value>;

/// Table name to its columns, for the whole active database.
pub type TableSchema = BTreeMap<String, Vec<ColumnInfo>>;

/// Outcome of one ad-hoc statement. Reads carry all matching rows, writes
/// carry the change counters; both carry the wall-clock duration of the
/// engine call only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Rows {
        rows: Vec<DbRow>,
        duration_ms: f64,
    },
    Exec {
        changes: u64,
        last_insert_id: i64,
        duration_ms: f64,
    },
}

/// One known database file. `path` is absent for the default database, whose
/// name and path coincide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub current: bool,
}

/// Parameters for one page of a table listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseRequest {
    pub table: String,
    pub page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub search: String,
}

/// One served page plus the totals the pager needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowsePage {
    pub rows: Vec<DbRow>,
    pub total_records: u64,
    pub total_pages: u64,
    pub page: u32,
    pub page_size: u32,
    pub duration_ms: f64,
}
