use std::env;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::model::{Match, VectorSearch};

/// Thin client for the Supabase REST surface: one stored-procedure call for
/// similarity search on the query path, one table insert for the indexer.
pub struct Supabase {
    client: Client,
    base_url: String,
    key: String,
    table: String,
    match_fn: String,
}

impl Supabase {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: env::var("SUPABASE_PROJECT_URL").expect("$SUPABASE_PROJECT_URL not set"),
            key: env::var("SUPABASE_PROJECT_KEY").expect("$SUPABASE_PROJECT_KEY not set"),
            table: env::var("SUPABASE_DB_TABLE").expect("$SUPABASE_DB_TABLE not set"),
            match_fn: env::var("SUPABASE_DB_FUNCTION_NAME")
                .expect("$SUPABASE_DB_FUNCTION_NAME not set"),
        }
    }

    /// Runs the similarity stored procedure against the vector table.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails or the response rows cannot be
    /// parsed. An error is never folded into an empty result set.
    pub async fn query(&self, vector: &[f32], threshold: f32, count: usize) -> Result<Vec<Match>> {
        let rows: Value = self
            .client
            .post(format!("{}/rest/v1/rpc/{}", self.base_url, self.match_fn))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .json(&serde_json::json!({
                "query_embedding": vector,
                "match_threshold": threshold,
                "match_count": count,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let matches = rows
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("Expected an array of match rows"))?
            .iter()
            .map(|row| serde_json::from_value::<Match>(row.clone()).map_err(Into::into))
            .collect::<Result<Vec<_>>>()?;

        debug!("Matched {} document(s)", matches.len());

        Ok(matches)
    }

    /// Inserts one `(slug, vector[, title])` row. Indexing-job only; the
    /// query path never writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert is rejected.
    pub async fn insert(&self, slug: &str, title: Option<&str>, vector: &[f32]) -> Result<()> {
        self.client
            .post(format!("{}/rest/v1/{}", self.base_url, self.table))
            .header("apikey", &self.key)
            .header("Prefer", "return=minimal")
            .bearer_auth(&self.key)
            .json(&serde_json::json!([{
                "id": slug,
                "title": title,
                "vector": vector,
            }]))
            .send()
            .await?
            .error_for_status()?;

        debug!("Stored embedding for {slug}");

        Ok(())
    }
}

impl Default for Supabase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorSearch for Supabase {
    async fn match_documents(
        &self,
        vector: &[f32],
        threshold: f32,
        count: usize,
    ) -> Result<Vec<Match>> {
        self.query(vector, threshold, count).await
    }
}
