use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::db::{Database, StoreError};
use crate::models::*;

pub const ROOT_MESSAGE: &str = "Cloud Learning Tracker API";
pub const DAY_EXISTS_MESSAGE: &str = "Day record already exists";

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================
// Error Handling
// ============================================================

/// Log a storage error and return a sanitized response to the client.
/// The full error is logged server-side; the client only sees a generic message.
fn internal_error(e: StoreError) -> ApiError {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal server error")),
    )
}

/// Creating a day whose date is taken is a client error; anything else is not.
fn create_error(e: StoreError) -> ApiError {
    if e.is_unique_violation() {
        tracing::warn!("Rejected duplicate day record: {}", e);
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(DAY_EXISTS_MESSAGE)),
        );
    }
    internal_error(e)
}

// ============================================================
// Service
// ============================================================

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

pub async fn health(State(db): State<Database>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        db: db.connection_info(),
    })
}

// ============================================================
// Days
// ============================================================

pub async fn list_days(State(db): State<Database>) -> Result<Json<Vec<DayRecord>>, ApiError> {
    db.list_days().await.map(Json).map_err(internal_error)
}

/// Never 404s: a date with no row is reported as not started.
pub async fn get_day(
    State(db): State<Database>,
    Path(date): Path<String>,
) -> Result<Json<DayRecord>, ApiError> {
    let found = db.find_day(&date).await.map_err(internal_error)?;
    Ok(Json(found.unwrap_or_else(|| DayRecord::not_started(date))))
}

pub async fn create_day(
    State(db): State<Database>,
    Json(input): Json<CreateDayInput>,
) -> Result<(StatusCode, Json<DayRecord>), ApiError> {
    db.create_day(input)
        .await
        .map(|day| (StatusCode::CREATED, Json(day)))
        .map_err(create_error)
}

pub async fn update_day(
    State(db): State<Database>,
    Path(date): Path<String>,
    Json(input): Json<UpdateDayInput>,
) -> Result<Json<DayRecord>, ApiError> {
    db.update_day(&date, input)
        .await
        .map(Json)
        .map_err(internal_error)
}
