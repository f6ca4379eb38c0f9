//! Fan a message out to every configured provider.
//!
//! Run with: cargo run -p orchestrator --example fanout -- "Your message here"
//!
//! Configuration via .env file or environment variables:
//!   OPENAI_API_KEY     - OpenAI key (also used for embeddings)
//!   ANTHROPIC_API_KEY  - Anthropic key
//!   GEMINI_API_KEY     - Google Gemini key
//!   GROK_API_KEY       - xAI key
//!   FANOUT_*           - Retry and circuit breaker tuning
//!
//! Providers without a key are skipped. Pattern analysis runs only when an
//! OpenAI key is available for embeddings.

use std::env;
use std::sync::Arc;

use orchestrator::{render_outcomes, Orchestrator, TurnProcessor};
use pattern_engine::{
    DiscussionStore, EmbeddingStore, InMemoryDiscussionStore, PatternConfig, PatternEngine,
};
use provider_clients::OpenAiEmbedder;
use provider_core::{Credentials, CredentialsSource, Embedder, EnvCredentials, Provider};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let message = if args.is_empty() {
        "In two sentences, what is a circuit breaker in distributed systems?".to_string()
    } else {
        args.join(" ")
    };

    let credentials: Credentials = EnvCredentials.credentials().await?;
    if credentials.is_empty() {
        warn!("No provider keys configured; every provider will be skipped");
    }
    info!(available = ?credentials.available(), "Loaded credentials");

    let orchestrator = Arc::new(Orchestrator::from_env()?);

    let Some(openai) = credentials.get(Provider::OpenAi) else {
        let outcomes = orchestrator
            .dispatch(&message, &[], &Provider::ALL, &credentials)
            .await;
        println!("{}", render_outcomes(&outcomes));
        return Ok(());
    };

    let embedder = OpenAiEmbedder::new(openai)?;
    let memory = Arc::new(EmbeddingStore::new(embedder.dimensions()));
    let engine = Arc::new(
        PatternEngine::new(memory.clone(), Arc::new(embedder)).with_config(PatternConfig::from_env()),
    );
    let store = Arc::new(InMemoryDiscussionStore::new());
    let turns = TurnProcessor::new(
        orchestrator,
        engine,
        store.clone(),
        Arc::new(credentials),
    );

    let result = turns.process("demo", &message, &Provider::ALL).await?;
    println!("{}", render_outcomes(&result.outcomes));

    if let Some(suggestion) = result.analysis.await?? {
        println!();
        println!(
            "Suggestion ({:.2}): {}",
            suggestion.confidence, suggestion.proposed_agent_template
        );
    }

    let state = store.breath_state("demo").await?;
    info!(
        phase = %state.phase,
        breath_count = state.breath_count(),
        indexed = memory.len().await,
        "Turn complete"
    );

    Ok(())
}
