//! PostgreSQL implementations of the day record operations.
//!
//! Each function checks a connection out of the pool and returns it when the
//! function exits, on success or error.
//!
//! `id` is cast to `BIGINT` on the way out so tables created with a 32-bit
//! `SERIAL` id read the same as ours.

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::{NoTls, Row};

use super::schema::POSTGRES_SCHEMA;
use super::StoreError;
use crate::models::*;

const LIST_SQL: &str = "SELECT id::BIGINT AS id, date, completed, content, updated_at
    FROM day_records ORDER BY date DESC";

const FIND_SQL: &str = "SELECT id::BIGINT AS id, date, completed, content, updated_at
    FROM day_records WHERE date = $1";

const UPSERT_SQL: &str = "
    INSERT INTO day_records (date, completed, content, updated_at)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (date) DO UPDATE SET
        completed = EXCLUDED.completed,
        content = EXCLUDED.content,
        updated_at = EXCLUDED.updated_at
    RETURNING id::BIGINT AS id, date, completed, content, updated_at";

pub fn create_pool(url: &str) -> Result<Pool, StoreError> {
    let pg_config = url.parse::<tokio_postgres::Config>()?;
    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );

    Ok(Pool::builder(manager).runtime(Runtime::Tokio1).build()?)
}

fn map_day(row: &Row) -> Result<DayRecord, tokio_postgres::Error> {
    Ok(DayRecord {
        id: Some(row.try_get("id")?),
        date: row.try_get("date")?,
        completed: row.try_get("completed")?,
        content: row.try_get::<_, Option<String>>("content")?.unwrap_or_default(),
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn ensure_schema(pool: &Pool) -> Result<(), StoreError> {
    let client = pool.get().await?;
    client.batch_execute(POSTGRES_SCHEMA).await?;
    tracing::debug!("day_records table ready");
    Ok(())
}

pub async fn list_days(pool: &Pool) -> Result<Vec<DayRecord>, StoreError> {
    let client = pool.get().await?;
    let rows = client.query(LIST_SQL, &[]).await?;
    let days = rows.iter().map(map_day).collect::<Result<Vec<_>, _>>()?;
    Ok(days)
}

pub async fn find_day(pool: &Pool, date: &str) -> Result<Option<DayRecord>, StoreError> {
    let client = pool.get().await?;
    let row = client.query_opt(FIND_SQL, &[&date]).await?;
    Ok(row.as_ref().map(map_day).transpose()?)
}

pub async fn insert_day(pool: &Pool, input: &CreateDayInput) -> Result<DayRecord, StoreError> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            "INSERT INTO day_records (date, completed, content, updated_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id::BIGINT AS id, date, completed, content, updated_at",
            &[&input.date, &input.completed, &input.content, &timestamp_now()],
        )
        .await?;
    Ok(map_day(&row)?)
}

pub async fn update_day(
    pool: &Pool,
    date: &str,
    input: UpdateDayInput,
) -> Result<DayRecord, StoreError> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let existing = tx
        .query_opt(FIND_SQL, &[&date])
        .await?
        .as_ref()
        .map(map_day)
        .transpose()?;
    let (completed, content) = input.merge(existing.as_ref());

    let row = tx
        .query_one(UPSERT_SQL, &[&date, &completed, &content, &timestamp_now()])
        .await?;
    tx.commit().await?;
    Ok(map_day(&row)?)
}

pub async fn import_days(pool: &Pool, days: &[ImportedDay]) -> Result<usize, StoreError> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;
    let stmt = tx.prepare(UPSERT_SQL).await?;

    for day in days {
        tx.query_one(
            &stmt,
            &[&day.date, &day.completed, &day.content, &day.updated_at],
        )
        .await?;
    }

    tx.commit().await?;
    Ok(days.len())
}
