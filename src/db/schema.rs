use rusqlite::Connection;

/// `day_records` for SQLite. `AUTOINCREMENT` keeps ids from being reused.
pub const SQLITE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS day_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL UNIQUE,
        completed INTEGER NOT NULL DEFAULT 0,
        content TEXT NOT NULL DEFAULT '',
        updated_at TEXT NOT NULL
    );
";

/// `day_records` for PostgreSQL.
pub const POSTGRES_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS day_records (
        id BIGSERIAL PRIMARY KEY,
        date TEXT NOT NULL UNIQUE,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        content TEXT NOT NULL DEFAULT '',
        updated_at TEXT NOT NULL
    );
";

pub fn ensure_sqlite(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SQLITE_SCHEMA)?;
    tracing::debug!("day_records table ready");
    Ok(())
}
