//! One-shot copy of every day record from a SQLite file into another store.
//!
//! Rows are upserted by date in one transaction, so the copy can be re-run
//! safely: a second run overwrites instead of duplicating, and a failed run
//! leaves the target as it was before that run.

use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

use crate::config::TransferConfig;
use crate::db::{Database, StoreError};
use crate::models::ImportedDay;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("SQLite DB not found at: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("reading SQLite source: {0}")]
    Source(#[from] rusqlite::Error),

    #[error("writing target: {0}")]
    Target(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    pub read: usize,
    pub written: usize,
}

/// Copy from the configured SQLite file into the configured PostgreSQL server.
pub async fn run(config: &TransferConfig) -> Result<TransferReport, TransferError> {
    let target = Database::open(&config.postgres_url)?;
    copy_days(&config.sqlite_path, &target).await
}

/// Copy every row of `source` into `target`. The target is only touched when
/// the source has at least one row.
pub async fn copy_days(source: &Path, target: &Database) -> Result<TransferReport, TransferError> {
    tracing::info!("Reading SQLite: {}", source.display());
    let days = read_source(source)?;
    tracing::info!("Found {} rows in SQLite", days.len());

    if days.is_empty() {
        tracing::warn!("SQLite has 0 rows. Nothing to migrate.");
        return Ok(TransferReport {
            read: 0,
            written: 0,
        });
    }

    tracing::info!("Writing to {}", target.connection_info());
    target.migrate().await?;
    let written = target.import_days(&days).await?;
    tracing::info!("Migrated {} rows", written);

    Ok(TransferReport {
        read: days.len(),
        written,
    })
}

/// Read and normalise every row of `day_records` in insertion order.
pub fn read_source(path: &Path) -> Result<Vec<ImportedDay>, TransferError> {
    if !path.is_file() {
        return Err(TransferError::SourceMissing(path.to_path_buf()));
    }

    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let mut stmt =
        conn.prepare("SELECT date, completed, content, updated_at FROM day_records ORDER BY id")?;

    let days = stmt
        .query_map([], |row| {
            Ok(ImportedDay {
                date: row.get(0)?,
                completed: coerce_bool(row.get(1)?),
                content: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                updated_at: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(days)
}

/// SQLite has no boolean type; older rows may hold integers, reals or text.
fn coerce_bool(value: Value) -> bool {
    match value {
        Value::Null => false,
        Value::Integer(n) => n != 0,
        Value::Real(f) => f != 0.0,
        Value::Text(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "f"
        ),
        Value::Blob(b) => !b.is_empty(),
    }
}
