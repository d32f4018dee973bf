use axum::{routing::post, Router};

use crate::{axum::state::AppState, http::controllers::MeetingController};

pub fn mount() -> Router<AppState> {
    Router::new()
        .route("/meetingSummary", post(MeetingController::summary))
        .route(
            "/meetingSummaryStream",
            post(MeetingController::summary_stream),
        )
}
