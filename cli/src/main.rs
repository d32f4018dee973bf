#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::{
    prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use ::wheels::{Agent, FsStore, OpenAI, Supabase, DEFAULT_MAX_TOKENS, MATCH_COUNT, MATCH_THRESHOLD};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Embed knowledge documents and store their vectors.
    Index { slugs: Vec<String> },
    /// Print the best match for a query.
    Query { query: String },
    /// Answer a query through the full pipeline.
    Ask { query: String },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "cli=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Index { slugs } => {
            let store = FsStore::from_env();
            let openai = OpenAI::new();
            let supabase = Supabase::new();

            for slug in slugs {
                match index_slug(&store, &openai, &supabase, &slug).await {
                    Ok(()) => info!("Embeddings stored for {slug}"),
                    Err(err) => error!("Failed to index {slug}: {err:#}"),
                }
            }
        }
        Commands::Query { query } => {
            let openai = OpenAI::new();
            let supabase = Supabase::new();

            let vector = openai.raw_embed(&query).await.unwrap();
            let results = supabase
                .query(&vector, MATCH_THRESHOLD, MATCH_COUNT)
                .await
                .unwrap();

            println!("{results:?}");
        }
        Commands::Ask { query } => {
            let agent = Agent::from_env();
            let answer = agent.answer(&query, DEFAULT_MAX_TOKENS).await.unwrap();

            println!("{answer}");
        }
    }
}

async fn index_slug(
    store: &FsStore,
    openai: &OpenAI,
    supabase: &Supabase,
    slug: &str,
) -> Result<()> {
    let document = store
        .read(slug)
        .ok_or_else(|| anyhow::anyhow!("No knowledge document for {slug}"))?;

    let vector = openai.raw_embed(&document.body).await?;
    supabase
        .insert(slug, document.title.as_deref(), &vector)
        .await?;

    Ok(())
}
