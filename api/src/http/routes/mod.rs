use axum::{http::StatusCode, Json, Router};
use serde_json::{json, Value};

mod agent;
mod meeting;

use crate::axum::state::AppState;

pub fn mount() -> Router<AppState> {
    Router::new()
        .nest("/mycustomagent", agent::mount().merge(meeting::mount()))
        .fallback(not_found)
}

#[allow(clippy::unused_async)]
async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}
