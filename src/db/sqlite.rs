//! SQLite implementations of the day record operations.
//!
//! Every function runs against a connection the caller has already locked, so
//! one call is one scoped use of the shared connection.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::*;

const SELECT_COLUMNS: &str = "SELECT id, date, completed, content, updated_at FROM day_records";

const UPSERT_SQL: &str = "
    INSERT INTO day_records (date, completed, content, updated_at)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(date) DO UPDATE SET
        completed = excluded.completed,
        content = excluded.content,
        updated_at = excluded.updated_at
    RETURNING id, date, completed, content, updated_at";

fn map_day(row: &Row<'_>) -> rusqlite::Result<DayRecord> {
    Ok(DayRecord {
        id: Some(row.get(0)?),
        date: row.get(1)?,
        completed: row.get(2)?,
        content: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        updated_at: row.get(4)?,
    })
}

pub fn list_days(conn: &Connection) -> rusqlite::Result<Vec<DayRecord>> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY date DESC"))?;
    let days = stmt
        .query_map([], map_day)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(days)
}

pub fn find_day(conn: &Connection, date: &str) -> rusqlite::Result<Option<DayRecord>> {
    conn.query_row(&format!("{SELECT_COLUMNS} WHERE date = ?1"), [date], map_day)
        .optional()
}

pub fn insert_day(conn: &Connection, input: &CreateDayInput) -> rusqlite::Result<DayRecord> {
    let now = timestamp_now();
    conn.execute(
        "INSERT INTO day_records (date, completed, content, updated_at) VALUES (?1, ?2, ?3, ?4)",
        (&input.date, input.completed, &input.content, &now),
    )?;

    Ok(DayRecord {
        id: Some(conn.last_insert_rowid()),
        date: input.date.clone(),
        completed: input.completed,
        content: input.content.clone(),
        updated_at: Some(now),
    })
}

pub fn update_day(
    conn: &mut Connection,
    date: &str,
    input: UpdateDayInput,
) -> rusqlite::Result<DayRecord> {
    let tx = conn.transaction()?;
    let existing = find_day(&tx, date)?;
    let (completed, content) = input.merge(existing.as_ref());

    let day = tx.query_row(UPSERT_SQL, (date, completed, &content, timestamp_now()), map_day)?;
    tx.commit()?;
    Ok(day)
}

pub fn import_days(conn: &mut Connection, days: &[ImportedDay]) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(UPSERT_SQL)?;
        for day in days {
            stmt.query_row(
                (&day.date, day.completed, &day.content, &day.updated_at),
                |_| Ok(()),
            )?;
        }
    }
    tx.commit()?;
    Ok(days.len())
}
