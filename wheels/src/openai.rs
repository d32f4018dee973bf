use anyhow::Result;
use async_openai::{
    types::{
        ChatCompletionRequestMessageArgs, CreateChatCompletionRequestArgs,
        CreateEmbeddingRequestArgs, Role,
    },
    Client,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;

use crate::{
    model::{ChatModel, Embedder},
    stream::ChunkStream,
};

const EMBEDDING_MODEL: &str = "text-embedding-3-small";
const COMPLETION_MODEL: &str = "gpt-4o-mini";

/// Wraps the hosted embeddings and chat-completion endpoints.
///
/// Every call is a single attempt; a remote failure fails the request that
/// made it and nothing else.
pub struct OpenAI {
    client: Arc<Client>,
}

impl OpenAI {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Arc::new(Client::new()),
        }
    }

    /// Embeds a string into a fixed-length vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the Embeddings API call fails or comes back with
    /// no embedding data.
    pub async fn raw_embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(EMBEDDING_MODEL)
            .input(text)
            .build()?;

        let response = self.client.embeddings().create(request).await?;

        Ok(response
            .data
            .first()
            .ok_or_else(|| anyhow::anyhow!("Could not find embedding"))?
            .embedding
            .clone())
    }

    /// Prompts the chat model for a single answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the Completions API call fails or returns no
    /// choices.
    pub async fn prompt(&self, prompt: &str, max_tokens: u16) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(COMPLETION_MODEL)
            .max_tokens(max_tokens)
            .messages(vec![ChatCompletionRequestMessageArgs::default()
                .role(Role::User)
                .content(prompt)
                .build()?])
            .build()?;

        let response = self.client.chat().create(request).await?;

        Ok(response
            .choices
            .first()
            .ok_or_else(|| anyhow::anyhow!("Could not find completion"))?
            .message
            .content
            .clone())
    }

    /// Opens a completion stream for the given prompt. Chunks are passed
    /// through as the JSON the API emitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be opened. Mid-stream failures
    /// surface as `Err` items on the stream itself.
    pub async fn prompt_stream(&self, prompt: &str, max_tokens: u16) -> Result<ChunkStream> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(COMPLETION_MODEL)
            .max_tokens(max_tokens)
            .messages(vec![ChatCompletionRequestMessageArgs::default()
                .role(Role::User)
                .content(prompt)
                .build()?])
            .build()?;

        let stream = self.client.chat().create_stream(request).await?;

        Ok(Box::pin(stream.map(|chunk| match chunk {
            Ok(chunk) => serde_json::to_value(chunk).map_err(Into::into),
            Err(err) => Err(err.into()),
        })))
    }
}

impl Default for OpenAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for OpenAI {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.raw_embed(text).await
    }
}

#[async_trait]
impl ChatModel for OpenAI {
    async fn complete(&self, prompt: &str, max_tokens: u16) -> Result<String> {
        self.prompt(prompt, max_tokens).await
    }

    async fn complete_stream(&self, prompt: &str, max_tokens: u16) -> Result<ChunkStream> {
        self.prompt_stream(prompt, max_tokens).await
    }
}
