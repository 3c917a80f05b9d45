mod handlers;
mod middleware;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::db::Database;

pub use handlers::{DAY_EXISTS_MESSAGE, ROOT_MESSAGE};
pub use middleware::{cors_layer, DEV_ORIGINS};

pub fn create_router(db: Database) -> Router {
    let api = Router::new()
        .route("/days", get(handlers::list_days).post(handlers::create_day))
        .route("/days/{date}", get(handlers::get_day).put(handlers::update_day));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&DEV_ORIGINS))
        .with_state(db)
}
