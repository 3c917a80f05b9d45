mod postgres;
mod schema;
mod sqlite;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use deadpool_postgres::Pool;
use rusqlite::Connection;
use thiserror::Error;
use tokio_postgres::error::SqlState;

use crate::config::DatabaseUrl;
use crate::models::*;

/// Raw storage failures. Callers decide which of these mean something to a user;
/// see [`StoreError::is_unique_violation`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("postgres: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("postgres pool: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("postgres pool setup: {0}")]
    PoolBuild(#[from] deadpool_postgres::BuildError),

    #[error("database directory: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True when the failure is the `date` uniqueness constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => {
                e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            }
            Self::Postgres(e) => e.code() == Some(&SqlState::UNIQUE_VIOLATION),
            Self::Pool(deadpool_postgres::PoolError::Backend(e)) => {
                e.code() == Some(&SqlState::UNIQUE_VIOLATION)
            }
            _ => false,
        }
    }
}

#[derive(Clone)]
enum Backend {
    Sqlite(Arc<Mutex<Connection>>),
    Postgres(Pool),
}

/// Handle to the day record store.
///
/// Cloning is cheap and every clone shares the same SQLite connection or
/// PostgreSQL pool. Each operation acquires the connection for its own
/// duration only.
#[derive(Clone)]
pub struct Database {
    backend: Backend,
    url: DatabaseUrl,
}

impl Database {
    /// Open whichever store `url` names. PostgreSQL connections are made lazily.
    pub fn open(url: &DatabaseUrl) -> Result<Self, StoreError> {
        match url {
            DatabaseUrl::Sqlite(path) => Self::open_sqlite(path.clone()),
            DatabaseUrl::SqliteMemory => Self::open_memory(),
            DatabaseUrl::Postgres(raw) => Self::connect_postgres(raw),
        }
    }

    pub fn open_sqlite(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            backend: Backend::Sqlite(Arc::new(Mutex::new(conn))),
            url: DatabaseUrl::Sqlite(path),
        })
    }

    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            backend: Backend::Sqlite(Arc::new(Mutex::new(conn))),
            url: DatabaseUrl::SqliteMemory,
        })
    }

    pub fn connect_postgres(url: &str) -> Result<Self, StoreError> {
        let pool = postgres::create_pool(url)?;
        Ok(Self {
            backend: Backend::Postgres(pool),
            url: DatabaseUrl::Postgres(url.to_string()),
        })
    }

    /// Connection string for display, with any password redacted.
    pub fn connection_info(&self) -> String {
        self.url.to_string()
    }

    /// Create the `day_records` table if it does not exist.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        match &self.backend {
            Backend::Sqlite(conn) => {
                let conn = lock(conn);
                Ok(schema::ensure_sqlite(&conn)?)
            }
            Backend::Postgres(pool) => postgres::ensure_schema(pool).await,
        }
    }

    // ============================================================
    // Day record operations
    // ============================================================

    /// Every record, newest date first.
    pub async fn list_days(&self) -> Result<Vec<DayRecord>, StoreError> {
        match &self.backend {
            Backend::Sqlite(conn) => {
                let conn = lock(conn);
                Ok(sqlite::list_days(&conn)?)
            }
            Backend::Postgres(pool) => postgres::list_days(pool).await,
        }
    }

    pub async fn find_day(&self, date: &str) -> Result<Option<DayRecord>, StoreError> {
        match &self.backend {
            Backend::Sqlite(conn) => {
                let conn = lock(conn);
                Ok(sqlite::find_day(&conn, date)?)
            }
            Backend::Postgres(pool) => postgres::find_day(pool, date).await,
        }
    }

    /// Insert a new record. Fails with a unique violation if `date` already has one.
    pub async fn create_day(&self, input: CreateDayInput) -> Result<DayRecord, StoreError> {
        let day = match &self.backend {
            Backend::Sqlite(conn) => {
                let conn = lock(conn);
                sqlite::insert_day(&conn, &input)?
            }
            Backend::Postgres(pool) => postgres::insert_day(pool, &input).await?,
        };
        tracing::debug!(date = %day.date, id = ?day.id, "created day record");
        Ok(day)
    }

    /// Upsert: create the record for `date` if missing, otherwise overwrite only
    /// the fields present in `input`. `updated_at` is always refreshed.
    pub async fn update_day(
        &self,
        date: &str,
        input: UpdateDayInput,
    ) -> Result<DayRecord, StoreError> {
        let day = match &self.backend {
            Backend::Sqlite(conn) => {
                let mut conn = lock(conn);
                sqlite::update_day(&mut conn, date, input)?
            }
            Backend::Postgres(pool) => postgres::update_day(pool, date, input).await?,
        };
        tracing::debug!(date = %day.date, id = ?day.id, "upserted day record");
        Ok(day)
    }

    /// Upsert a batch keyed by date in a single transaction. Returns the number
    /// of rows written.
    pub async fn import_days(&self, days: &[ImportedDay]) -> Result<usize, StoreError> {
        match &self.backend {
            Backend::Sqlite(conn) => {
                let mut conn = lock(conn);
                Ok(sqlite::import_days(&mut conn, days)?)
            }
            Backend::Postgres(pool) => postgres::import_days(pool, days).await,
        }
    }
}

// Guards must stay inside a block with no `.await` so the returned futures stay `Send`.
fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().expect("database lock poisoned")
}
