use anyhow::Result;
use async_trait::async_trait;

use crate::stream::ChunkStream;

/// One similarity-search hit: a knowledge-base slug and its score.
///
/// Results come back ordered by non-increasing score, and every entry
/// already cleared the caller's similarity threshold.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Match {
    pub id: String,
    // The stored procedure names the column `similarity`.
    #[serde(alias = "similarity")]
    pub score: f32,
}

/// Turns text into a fixed-length embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// A single remote call, no retry. A failure here is fatal for the
    /// request that needed the vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Chat-completion backend, in single-shot and streaming form.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u16) -> Result<String>;

    /// Opens a completion stream. Each chunk is relayed downstream as the
    /// JSON value the backend emitted, unmodified.
    async fn complete_stream(&self, prompt: &str, max_tokens: u16) -> Result<ChunkStream>;
}

/// Nearest-neighbor lookup against the vector table.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Returns at most `count` matches scoring at least `threshold`.
    /// A remote failure is an `Err`, never an empty list.
    async fn match_documents(
        &self,
        vector: &[f32],
        threshold: f32,
        count: usize,
    ) -> Result<Vec<Match>>;
}

/// Read-only access to the knowledge documents on disk.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// `None` covers every failure mode: unknown slug, unreadable file,
    /// unparseable content. Callers treat it as "no content".
    async fn fetch(&self, slug: &str) -> Option<String>;
}
