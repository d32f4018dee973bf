use axum::{
    extract::State,
    response::sse::{Event, Sse},
    Json,
};
use futures::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use tracing::info;
use wheels::{clarify, DEFAULT_MAX_TOKENS};

use crate::{
    axum::{
        errors::{ApiError, ApiResult},
        state::AppState,
    },
    http::controllers::relay,
};

#[derive(Debug, serde::Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Superset body accepted by every endpoint: either the legacy `data`
/// field or a `messages` transcript, plus optional budget and session.
#[derive(Debug, serde::Deserialize)]
pub struct PromptRequest {
    pub data: Option<String>,
    pub messages: Option<Vec<ChatMessage>>,
    pub max_token: Option<u16>,
    pub session: Option<String>,
}

impl PromptRequest {
    pub fn max_tokens(&self) -> u16 {
        self.max_token.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn session(&self) -> &str {
        self.session.as_deref().unwrap_or("default")
    }
}

fn transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|message| format!("{}: {}", message.role, message.content))
        .collect::<Vec<_>>()
        .join(",")
}

/// Resolves the query the pipeline will answer. Conversations are reduced
/// to a clarified one-liner first; a clarification failure fails the
/// request before any retrieval happens. The legacy `data` field is used
/// as-is after the non-empty check.
async fn resolve_query(state: &AppState, request: &PromptRequest) -> ApiResult<String> {
    if let Some(messages) = request.messages.as_deref() {
        if messages.is_empty() {
            return Err(ApiError::EmptyMessages);
        }

        let clarified = clarify::restate_intent(
            &*state.agent.model(),
            &transcript(messages),
            request.max_tokens(),
        )
        .await
        .map_err(ApiError::Clarification)?;
        info!("User query clarified: {clarified}");

        return Ok(clarified);
    }

    match request.data.as_deref().map(str::trim) {
        Some(data) if !data.is_empty() => Ok(data.to_owned()),
        _ => Err(ApiError::MissingData),
    }
}

pub async fn prompt(
    State(state): State<AppState>,
    payload: Option<Json<PromptRequest>>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload.ok_or(ApiError::InvalidBody)?;
    let query = resolve_query(&state, &request).await?;
    let answer = state.agent.answer(&query, request.max_tokens()).await?;

    Ok(Json(json!({ "message": answer })))
}

pub async fn prompt_stream(
    State(state): State<AppState>,
    payload: Option<Json<PromptRequest>>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let Json(request) = payload.ok_or(ApiError::InvalidBody)?;
    let query = resolve_query(&state, &request).await?;
    let chunks = state.agent.answer_stream(&query, request.max_tokens()).await;

    Ok(relay(chunks))
}
