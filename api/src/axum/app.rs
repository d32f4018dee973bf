use axum::Router;
use std::env;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{axum::state, http::routes};

const REQUIRED_ENV_VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "SUPABASE_PROJECT_URL",
    "SUPABASE_PROJECT_KEY",
    "SUPABASE_DB_TABLE",
    "SUPABASE_DB_FUNCTION_NAME",
];

pub fn create() -> Router {
    for var in REQUIRED_ENV_VARS {
        assert!(env::var(var).is_ok(), "${var} not set");
    }

    routes::mount()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state::create())
}
