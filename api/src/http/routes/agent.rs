use axum::{routing::post, Router};

use crate::{axum::state::AppState, http::controllers::AgentController};

pub fn mount() -> Router<AppState> {
    Router::new()
        .route("/prompt", post(AgentController::prompt))
        .route("/promptStream", post(AgentController::prompt_stream))
}
