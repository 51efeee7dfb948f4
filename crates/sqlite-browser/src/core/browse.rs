use rusqlite::Connection;

use crate::core::types::{BrowsePage, BrowseRequest, QueryOutcome, TableSchema};
use crate::core::{query, schema};
use crate::error::{AppError, AppResult};

/// Builds the OR-of-LIKE filter over every column of the requested table.
///
/// The search term is interpolated literally, not bound, which is an
/// injection surface (see DESIGN.md). An unknown table yields no filter at
/// all: the search is silently ignored and the statement runs unfiltered.
pub fn filter_clause(request: &BrowseRequest, table_schema: &TableSchema) -> String {
    let term = request.search.trim();
    if term.is_empty() {
        return String::new();
    }
    let Some(columns) = table_schema.get(&request.table) else {
        return String::new();
    };
    if columns.is_empty() {
        return String::new();
    }

    let conditions: Vec<String> = columns
        .iter()
        .map(|col| format!("{} LIKE '%{}%'", col.name, term))
        .collect();
    format!("WHERE {}", conditions.join(" OR "))
}

pub fn count_sql(request: &BrowseRequest, filter: &str) -> String {
    format!("SELECT COUNT(*) as count FROM {} {}", request.table, filter)
}

pub fn select_sql(request: &BrowseRequest, filter: &str) -> String {
    let offset = u64::from(request.page) * u64::from(request.page_size);
    format!(
        "SELECT * FROM {} {} LIMIT {} OFFSET {}",
        request.table, filter, request.page_size, offset
    )
}

/// ceil(total / page_size), clamped to a minimum of 1 for display.
pub fn total_pages(total_records: u64, page_size: u32) -> u64 {
    total_records.div_ceil(u64::from(page_size).max(1)).max(1)
}

/// Serves one page of a table: a COUNT with the search filter, then the
/// LIMIT/OFFSET SELECT. `page` is expected to be pre-clamped by the caller;
/// this function does not adjust it.
pub fn run(conn: &Connection, request: &BrowseRequest) -> AppResult<BrowsePage> {
    if request.page_size == 0 {
        return Err(AppError::InvalidRequest("page_size must be at least 1".into()));
    }

    let snapshot = schema::snapshot(conn)?;
    let filter = filter_clause(request, &snapshot);

    let total_records = match query::execute(conn, &count_sql(request, &filter))? {
        QueryOutcome::Rows { rows, .. } => rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0),
        QueryOutcome::Exec { .. } => 0,
    };

    let (rows, duration_ms) = match query::execute(conn, &select_sql(request, &filter))? {
        QueryOutcome::Rows { rows, duration_ms } => (rows, duration_ms),
        QueryOutcome::Exec { .. } => (Vec::new(), 0.0),
    };

    Ok(BrowsePage {
        rows,
        total_records,
        total_pages: total_pages(total_records, request.page_size),
        page: request.page,
        page_size: request.page_size,
        duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::seed;

    fn request(table: &str, page: u32, page_size: u32, search: &str) -> BrowseRequest {
        BrowseRequest {
            table: table.into(),
            page,
            page_size,
            search: search.into(),
        }
    }

    fn seeded_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        seed::seed_demo(&conn).expect("seed");
        conn
    }

    #[test]
    fn filter_ors_a_like_over_every_column() {
        let conn = seeded_conn();
        let snapshot = schema::snapshot(&conn).expect("snapshot");
        let clause = filter_clause(&request("users", 0, 10, "alice"), &snapshot);
        assert!(clause.starts_with("WHERE "));
        assert!(clause.contains("name LIKE '%alice%'"));
        assert!(clause.contains("email LIKE '%alice%'"));
        assert_eq!(clause.matches(" OR ").count(), 4);
    }

    #[test]
    fn unknown_table_silently_drops_the_search() {
        let conn = seeded_conn();
        let snapshot = schema::snapshot(&conn).expect("snapshot");
        assert_eq!(filter_clause(&request("nope", 0, 10, "alice"), &snapshot), "");
    }

    #[test]
    fn blank_search_builds_no_filter() {
        let conn = seeded_conn();
        let snapshot = schema::snapshot(&conn).expect("snapshot");
        assert_eq!(filter_clause(&request("users", 0, 10, "   "), &snapshot), "");
    }

    #[test]
    fn statements_carry_limit_offset_and_filter() {
        let req = request("users", 2, 25, "");
        assert_eq!(count_sql(&req, ""), "SELECT COUNT(*) as count FROM users ");
        assert_eq!(
            select_sql(&req, ""),
            "SELECT * FROM users  LIMIT 25 OFFSET 50"
        );
    }

    #[test]
    fn total_pages_rounds_up_and_never_hits_zero() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(4, 3), 2);
    }

    #[test]
    fn pages_never_exceed_the_remaining_records() {
        let conn = seeded_conn();

        let first = run(&conn, &request("users", 0, 3, "")).expect("page 0");
        assert_eq!(first.total_records, 4);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.rows.len(), 3);

        let second = run(&conn, &request("users", 1, 3, "")).expect("page 1");
        assert_eq!(second.rows.len(), 1);
        assert!(second.duration_ms >= 0.0);
    }

    #[test]
    fn search_filters_the_count_and_the_rows() {
        let conn = seeded_conn();
        let page = run(&conn, &request("users", 0, 10, "alice")).expect("page");
        assert_eq!(page.total_records, 1);
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0]["email"], serde_json::json!("alice@example.com"));
    }

    #[test]
    fn browsing_an_unknown_table_surfaces_the_engine_error() {
        let conn = seeded_conn();
        let err = run(&conn, &request("nope", 0, 10, "x")).unwrap_err();
        assert!(matches!(err, AppError::SqlError(_)));
    }
}
