use axum::extract::{DefaultBodyLimit, State};
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use super::SharedState;
use super::api;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    let body_limit = state.config().max_upload_bytes();

    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        // --- Labels ---
        .route("/api/columns", post(api::labels::inspect_columns))
        .route("/api/labels", post(api::labels::generate_from_upload))
        .route("/api/labels/database", post(api::labels::generate_from_database))
        // --- Middleware ---
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler(State(state): State<SharedState>) -> Json<Value> {
    let config = state.config();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "started_at": state.started_at().to_rfc3339(),
        "database": config.db_path.is_some(),
        "label": {
            "width_cm": config.label_width_cm,
            "height_cm": config.label_height_cm,
        },
    }))
}
