use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::info;

use crate::{
    clarify,
    model::ChatModel,
    prompt::build_meeting_prompt,
    stream::{self, ChunkStream},
};

/// Acknowledgment returned when a message was appended to the history.
pub const STORED_MESSAGE: &str = "message stored in history";

/// Reply for a summary request against an empty history. No completion call
/// is made in that case.
pub const NO_HISTORY_MESSAGE: &str = "No Meeting Conversation found";

/// Per-session accumulated meeting messages, owned by the endpoint layer
/// and shared across requests for the lifetime of the process.
///
/// Concurrent appends to one session land in request-arrival order; that
/// order is not deterministic under concurrency and no further ordering is
/// promised.
#[derive(Debug, Default)]
pub struct MeetingLog {
    sessions: RwLock<HashMap<String, Vec<String>>>,
}

impl MeetingLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, session: &str, message: &str) {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session.to_owned())
            .or_default()
            .push(message.to_owned());
    }

    /// The session's history joined with newlines; empty string when the
    /// session has none.
    pub async fn joined(&self, session: &str) -> String {
        let sessions = self.sessions.read().await;
        sessions
            .get(session)
            .map(|messages| messages.join("\n"))
            .unwrap_or_default()
    }

    /// Drops a session's history. Nothing on the query path calls this:
    /// summaries are cumulative over the whole meeting by policy.
    pub async fn reset(&self, session: &str) {
        self.sessions.write().await.remove(session);
    }
}

/// What a meeting message turned into.
#[derive(Debug)]
pub enum SummaryOutcome {
    /// Not a summary request; the message was appended to the history.
    Stored,
    /// A summary was requested but the session has no history yet.
    NoHistory,
    /// The generated summary.
    Summary(String),
}

/// Runs one message through the meeting state machine.
///
/// The summary-intent classification runs fresh on every message; there is
/// no persisted mode. History is never cleared here, so later summaries
/// cover the whole accumulated conversation.
///
/// # Errors
///
/// Returns an error when the classification or the summary completion call
/// fails.
pub async fn summarize(
    model: &dyn ChatModel,
    log: &MeetingLog,
    session: &str,
    latest: &str,
    max_tokens: u16,
) -> Result<SummaryOutcome> {
    if !clarify::wants_summary(model, latest, max_tokens).await? {
        log.append(session, latest).await;
        return Ok(SummaryOutcome::Stored);
    }

    let history = log.joined(session).await;
    if history.is_empty() {
        info!("Summary requested with no stored conversation");
        return Ok(SummaryOutcome::NoHistory);
    }

    let prompt = build_meeting_prompt(&history);
    info!("Prompt to LLM => {prompt}");
    let summary = model.complete(&prompt, max_tokens).await?;

    Ok(SummaryOutcome::Summary(summary))
}

/// Streaming twin of [`summarize`]: the stored and empty-history branches
/// become synthetic single-chunk streams so the endpoint can keep its SSE
/// framing without a model stream ever opening.
///
/// # Errors
///
/// Returns an error when classification fails or the model stream cannot be
/// opened.
pub async fn summarize_stream(
    model: &dyn ChatModel,
    log: &MeetingLog,
    session: &str,
    latest: &str,
    max_tokens: u16,
) -> Result<ChunkStream> {
    if !clarify::wants_summary(model, latest, max_tokens).await? {
        log.append(session, latest).await;
        return Ok(stream::message(STORED_MESSAGE));
    }

    let history = log.joined(session).await;
    if history.is_empty() {
        info!("Summary requested with no stored conversation");
        return Ok(stream::message(NO_HISTORY_MESSAGE));
    }

    let prompt = build_meeting_prompt(&history);
    info!("Prompt to LLM => {prompt}");

    model.complete_stream(&prompt, max_tokens).await
}
