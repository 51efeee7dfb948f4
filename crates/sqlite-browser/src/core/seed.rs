use rusqlite::{params, Connection};

use crate::error::AppResult;

/// Creates the demo tables in the default database and fills them with a
/// handful of rows. Inserts run only while `users` is empty, so restarts do
/// not duplicate data.
pub fn seed_demo(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            role TEXT DEFAULT 'user',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER,
            amount DECIMAL(10, 2),
            status TEXT CHECK(status IN ('pending', 'completed', 'cancelled')),
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY(user_id) REFERENCES users(id)
        );",
    )?;

    let users: i64 = conn.query_row("SELECT count(*) FROM users", [], |r| r.get(0))?;
    if users > 0 {
        return Ok(());
    }

    tracing::info!("seeding demo data");
    let mut insert_user =
        conn.prepare("INSERT INTO users (name, email, role) VALUES (?1, ?2, ?3)")?;
    for (name, email, role) in [
        ("Alice Johnson", "alice@example.com", "admin"),
        ("Bob Smith", "bob@example.com", "user"),
        ("Charlie Brown", "charlie@example.com", "user"),
        ("Diana Prince", "diana@example.com", "user"),
    ] {
        insert_user.execute(params![name, email, role])?;
    }

    let mut insert_order =
        conn.prepare("INSERT INTO orders (user_id, amount, status) VALUES (?1, ?2, ?3)")?;
    for (user_id, amount, status) in [
        (1i64, 99.99, "completed"),
        (2, 49.50, "pending"),
        (1, 150.00, "completed"),
        (3, 25.00, "cancelled"),
    ] {
        insert_order.execute(params![user_id, amount, status])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_twice_does_not_duplicate_rows() {
        let conn = Connection::open_in_memory().expect("in-memory db");
        seed_demo(&conn).expect("first seed");
        seed_demo(&conn).expect("second seed");

        let users: i64 = conn
            .query_row("SELECT count(*) FROM users", [], |r| r.get(0))
            .expect("count");
        let orders: i64 = conn
            .query_row("SELECT count(*) FROM orders", [], |r| r.get(0))
            .expect("count");
        assert_eq!(users, 4);
        assert_eq!(orders, 4);
    }
}
