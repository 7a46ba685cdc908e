use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = if state.pool.is_closed() { "closed" } else { "ok" };
    let body = json!({
        "status": "ok",
        "database": database,
    });
    (StatusCode::OK, Json(body))
}
