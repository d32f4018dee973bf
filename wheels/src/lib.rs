#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod clarify;
pub mod meeting;
mod model;
pub mod openai;
mod pipeline;
mod prompt;
pub mod store;
pub mod stream;
mod supabase;

pub use model::{ChatModel, DocumentStore, Embedder, Match, VectorSearch};
pub use openai::OpenAI;
pub use pipeline::{Agent, FALLBACK_CONTEXT, MATCH_COUNT, MATCH_THRESHOLD};
pub use prompt::{build_meeting_prompt, build_prompt};
pub use store::FsStore;
pub use supabase::Supabase;

/// Completion budget applied when the caller doesn't send one.
pub const DEFAULT_MAX_TOKENS: u16 = 1024;
