use std::sync::Arc;

use wheels::{meeting::MeetingLog, Agent};

/// Shared per-process state: the retrieval agent and the meeting history.
pub struct State {
    pub agent: Agent,
    pub meetings: MeetingLog,
}

#[allow(clippy::module_name_repetitions)]
pub type AppState = Arc<State>;

pub fn create() -> AppState {
    Arc::new(State {
        agent: Agent::from_env(),
        meetings: MeetingLog::new(),
    })
}
