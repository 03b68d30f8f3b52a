//! Tome application binary - composition root.
//!
//! Ties together all Tome crates into a single executable:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Build the document store (embedding backend + vector index)
//! 3. Build the chat orchestrator with the generation backend
//! 4. Start the axum REST API server
//!
//! With `TOME_API_KEY` set, the remote embedding and chat-completions
//! clients are used; without it the service falls back to the deterministic
//! mock backends so local work and demos need no credentials.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use tome_api::{routes, AppState};
use tome_chat::{ChatCompletionsClient, ChatOrchestrator, MockGenerator, ResponseGenerator};
use tome_core::config::TomeConfig;
use tome_store::{DocumentReader, DocumentStore, DynEmbeddingService, HttpEmbeddingClient, MockEmbedding};

mod cli;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

/// Build the embedding and generation backends.
///
/// Remote clients when an API key is available, mocks otherwise.
fn build_backends(
    config: &TomeConfig,
) -> Result<(Box<dyn DynEmbeddingService>, Box<dyn ResponseGenerator>), Box<dyn std::error::Error>>
{
    match std::env::var("TOME_API_KEY") {
        Ok(api_key) if !api_key.trim().is_empty() => {
            let embedder = HttpEmbeddingClient::new(
                &config.embedding.base_url,
                api_key.clone(),
                &config.embedding.model,
                config.embedding.dimensions,
            )?;
            let generator = ChatCompletionsClient::new(&config.generator, api_key)?;
            tracing::info!(
                embedding_model = %config.embedding.model,
                chat_model = %config.generator.model,
                "Remote model backends configured"
            );
            Ok((Box::new(embedder), Box::new(generator)))
        }
        _ => {
            tracing::warn!(
                "TOME_API_KEY not set, using deterministic mock backends. \
                 Replies echo the input; set the key for real model output."
            );
            Ok((Box::new(MockEmbedding::new()), Box::new(MockGenerator::new())))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = TomeConfig::load_or_default(&config_file);
    if let Some(data_dir) = args.resolve_data_dir() {
        config.general.data_dir = data_dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }
    config.general.port = args.resolve_port(config.general.port);

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Tome v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage directory for uploads.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    let storage_dir = if PathBuf::from(&config.documents.storage_dir).is_absolute() {
        PathBuf::from(&config.documents.storage_dir)
    } else {
        data_dir.join(&config.documents.storage_dir)
    };
    if let Err(e) = std::fs::create_dir_all(&storage_dir) {
        tracing::error!(path = %storage_dir.display(), error = %e, "Failed to create storage directory");
        return Err(e.into());
    }

    // Model backends and document store.
    let (embedder, generator) = build_backends(&config)?;
    let reader = DocumentReader::new(&storage_dir, config.documents.supported_types.clone());
    let store = Arc::new(DocumentStore::new(embedder, reader, &config.rag));
    tracing::info!(path = %storage_dir.display(), "Document store ready");

    // Orchestrator with injected store and generator.
    let orchestrator = ChatOrchestrator::new(Arc::clone(&store), generator, &config);

    // API server.
    let state = AppState::new(config, store, orchestrator);
    routes::start_server(state).await?;

    Ok(())
}
