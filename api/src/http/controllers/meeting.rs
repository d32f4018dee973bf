use axum::{
    extract::State,
    response::sse::{Event, Sse},
    Json,
};
use futures::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use wheels::meeting::{self, SummaryOutcome};

use crate::{
    axum::{
        errors::{ApiError, ApiResult},
        state::AppState,
    },
    http::controllers::{agent::PromptRequest, relay},
};

fn latest_message(request: &PromptRequest) -> ApiResult<String> {
    request
        .messages
        .as_deref()
        .and_then(|messages| messages.last())
        .map(|message| message.content.clone())
        .ok_or(ApiError::EmptyMessages)
}

pub async fn summary(
    State(state): State<AppState>,
    payload: Option<Json<PromptRequest>>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload.ok_or(ApiError::InvalidBody)?;
    let latest = latest_message(&request)?;

    let outcome = meeting::summarize(
        &*state.agent.model(),
        &state.meetings,
        request.session(),
        &latest,
        request.max_tokens(),
    )
    .await?;

    let message = match outcome {
        SummaryOutcome::Stored => meeting::STORED_MESSAGE.to_owned(),
        SummaryOutcome::NoHistory => meeting::NO_HISTORY_MESSAGE.to_owned(),
        SummaryOutcome::Summary(summary) => summary,
    };

    Ok(Json(json!({ "message": message })))
}

pub async fn summary_stream(
    State(state): State<AppState>,
    payload: Option<Json<PromptRequest>>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let Json(request) = payload.ok_or(ApiError::InvalidBody)?;
    let latest = latest_message(&request)?;

    let chunks = meeting::summarize_stream(
        &*state.agent.model(),
        &state.meetings,
        request.session(),
        &latest,
        request.max_tokens(),
    )
    .await?;

    Ok(relay(chunks))
}
