use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::{
    model::{ChatModel, DocumentStore, Embedder, VectorSearch},
    prompt::build_prompt,
    stream::{self, ChunkStream},
    FsStore, OpenAI, Supabase,
};

/// Similarity cutoff below which a stored document is not considered a match.
pub const MATCH_THRESHOLD: f32 = 0.40;

/// Only the single best match is ever used; documents are never fused.
pub const MATCH_COUNT: usize = 1;

/// Grounding text used when retrieval produces nothing — the request is
/// degraded, not failed.
pub const FALLBACK_CONTEXT: &str = "Welcome to Food on Wheels Customer Support! You can ask me about your recent orders, feedback, payments info, or FAQs about the company. How can I assist you today?";

const STREAM_FAILURE_MESSAGE: &str = "Error processing your request. Please try again.";

/// The retrieval-augmented answer pipeline: embed the query, look up the
/// best-matching document, splice its text into the prompt template, and
/// hand the prompt to the chat model.
pub struct Agent {
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn ChatModel>,
    index: Arc<dyn VectorSearch>,
    store: Arc<dyn DocumentStore>,
}

impl Agent {
    #[must_use]
    pub fn new(
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn ChatModel>,
        index: Arc<dyn VectorSearch>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            embedder,
            model,
            index,
            store,
        }
    }

    /// Wires the hosted clients from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let openai = Arc::new(OpenAI::new());

        Self {
            embedder: openai.clone(),
            model: openai,
            index: Arc::new(Supabase::new()),
            store: Arc::new(FsStore::from_env()),
        }
    }

    /// The chat model backing this agent, shared with the meeting endpoints.
    #[must_use]
    pub fn model(&self) -> Arc<dyn ChatModel> {
        self.model.clone()
    }

    /// Answers a query in one shot.
    ///
    /// # Errors
    ///
    /// Returns an error when embedding, matching, or the completion call
    /// fails. A query with no matching document is not an error — the fixed
    /// fallback context grounds the prompt instead.
    pub async fn answer(&self, query: &str, max_tokens: u16) -> Result<String> {
        let context = self.retrieve_context(query).await?;
        let prompt = build_prompt(query, &context);
        info!("Prompt to LLM => {prompt}");

        self.model.complete(&prompt, max_tokens).await
    }

    /// Streaming form of [`answer`](Self::answer).
    ///
    /// Never fails: when setup breaks before the model stream opens, the
    /// returned stream carries a single chunk explaining the failure, so the
    /// SSE transport can still be terminated properly.
    pub async fn answer_stream(&self, query: &str, max_tokens: u16) -> ChunkStream {
        match self.open_stream(query, max_tokens).await {
            Ok(chunks) => chunks,
            Err(err) => {
                error!("Failed to open completion stream: {err:#}");
                stream::error(STREAM_FAILURE_MESSAGE)
            }
        }
    }

    async fn open_stream(&self, query: &str, max_tokens: u16) -> Result<ChunkStream> {
        let context = self.retrieve_context(query).await?;
        let prompt = build_prompt(query, &context);
        info!("Prompt to LLM => {prompt}");

        self.model.complete_stream(&prompt, max_tokens).await
    }

    async fn retrieve_context(&self, query: &str) -> Result<String> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .context("embedding failed")?;

        let matches = self
            .index
            .match_documents(&vector, MATCH_THRESHOLD, MATCH_COUNT)
            .await
            .context("match failed")?;

        let Some(best) = matches.first() else {
            info!("No match above threshold; falling back to canned context");
            return Ok(FALLBACK_CONTEXT.to_owned());
        };

        // A matched slug whose file is gone counts as "no content".
        match self.store.fetch(&best.id).await {
            Some(body) => Ok(body),
            None => Ok(FALLBACK_CONTEXT.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Agent, FALLBACK_CONTEXT};
    use crate::{
        model::{ChatModel, DocumentStore, Embedder, Match, VectorSearch},
        stream::{self, ChunkStream},
    };
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    struct FixedEmbedder(Result<Vec<f32>, ()>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.0.clone().map_err(|()| anyhow!("remote refused"))
        }
    }

    struct FixedIndex(Result<Vec<Match>, ()>);

    #[async_trait]
    impl VectorSearch for FixedIndex {
        async fn match_documents(
            &self,
            _vector: &[f32],
            _threshold: f32,
            _count: usize,
        ) -> Result<Vec<Match>> {
            self.0.clone().map_err(|()| anyhow!("rpc failed"))
        }
    }

    struct MapStore(HashMap<String, String>);

    #[async_trait]
    impl DocumentStore for MapStore {
        async fn fetch(&self, slug: &str) -> Option<String> {
            self.0.get(slug).cloned()
        }
    }

    /// Records every prompt it sees and replies with a fixed string (or the
    /// prompt itself when constructed with `echo`).
    struct RecordingModel {
        prompts: Mutex<Vec<String>>,
        reply: Option<String>,
    }

    impl RecordingModel {
        fn canned(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                reply: Some(reply.to_owned()),
            })
        }

        fn echo() -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                reply: None,
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn complete(&self, prompt: &str, _max_tokens: u16) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_owned());
            Ok(self.reply.clone().unwrap_or_else(|| prompt.to_owned()))
        }

        async fn complete_stream(&self, prompt: &str, _max_tokens: u16) -> Result<ChunkStream> {
            self.prompts.lock().unwrap().push(prompt.to_owned());
            Ok(stream::message(
                &self.reply.clone().unwrap_or_else(|| prompt.to_owned()),
            ))
        }
    }

    fn agent(
        embedder: FixedEmbedder,
        index: FixedIndex,
        store: MapStore,
        model: Arc<RecordingModel>,
    ) -> Agent {
        Agent::new(Arc::new(embedder), model, Arc::new(index), Arc::new(store))
    }

    #[tokio::test]
    async fn retrieved_document_reaches_the_prompt() {
        let model = RecordingModel::canned("Jane Doe founded it in 2019.");
        let store = MapStore(HashMap::from([(
            "faq".to_owned(),
            "Food on Wheels was founded in 2019 by Jane Doe.".to_owned(),
        )]));
        let agent = agent(
            FixedEmbedder(Ok(vec![0.1; 1536])),
            FixedIndex(Ok(vec![Match {
                id: "faq".to_owned(),
                score: 0.83,
            }])),
            store,
            model.clone(),
        );

        let answer = agent
            .answer("Who founded Food on Wheels?", 1024)
            .await
            .unwrap();

        assert_eq!(answer, "Jane Doe founded it in 2019.");
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Food on Wheels was founded in 2019 by Jane Doe."));
        assert!(prompts[0].contains("Who founded Food on Wheels?"));
    }

    #[tokio::test]
    async fn zero_matches_fall_back_to_the_welcome_context() {
        let model = RecordingModel::echo();
        let agent = agent(
            FixedEmbedder(Ok(vec![0.1; 4])),
            FixedIndex(Ok(Vec::new())),
            MapStore(HashMap::new()),
            model,
        );

        let answer = agent.answer("anything at all", 1024).await.unwrap();

        assert!(answer.contains(FALLBACK_CONTEXT));
    }

    #[tokio::test]
    async fn matched_but_missing_document_falls_back() {
        let model = RecordingModel::echo();
        let agent = agent(
            FixedEmbedder(Ok(vec![0.1; 4])),
            FixedIndex(Ok(vec![Match {
                id: "gone".to_owned(),
                score: 0.9,
            }])),
            MapStore(HashMap::new()),
            model,
        );

        let answer = agent.answer("anything", 1024).await.unwrap();

        assert!(answer.contains(FALLBACK_CONTEXT));
    }

    #[tokio::test]
    async fn embedding_failure_aborts_the_request() {
        let agent = agent(
            FixedEmbedder(Err(())),
            FixedIndex(Ok(Vec::new())),
            MapStore(HashMap::new()),
            RecordingModel::echo(),
        );

        let err = agent.answer("query", 1024).await.unwrap_err();
        assert!(format!("{err:#}").contains("embedding failed"));
    }

    #[tokio::test]
    async fn match_failure_aborts_the_request() {
        let agent = agent(
            FixedEmbedder(Ok(vec![0.5; 4])),
            FixedIndex(Err(())),
            MapStore(HashMap::new()),
            RecordingModel::echo(),
        );

        let err = agent.answer("query", 1024).await.unwrap_err();
        assert!(format!("{err:#}").contains("match failed"));
    }

    #[tokio::test]
    async fn broken_setup_still_yields_a_stream() {
        let agent = agent(
            FixedEmbedder(Err(())),
            FixedIndex(Ok(Vec::new())),
            MapStore(HashMap::new()),
            RecordingModel::echo(),
        );

        let chunks: Vec<_> = agent.answer_stream("query", 1024).await.collect().await;

        assert_eq!(chunks.len(), 1);
        let chunk = chunks[0].as_ref().unwrap();
        assert!(chunk["error"].as_str().unwrap().contains("Error processing"));
    }
}
