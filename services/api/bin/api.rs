//! Main Entrypoint for the Lango API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Building the queue store, prompt templates and dialogue generator.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use lango_api::{
    config::{Config, Provider},
    router::create_router,
    state::AppState,
    store::FileLearningRepository,
    templates::FileTemplateSource,
};
use lango_core::{
    CoachOrchestrator,
    dialogue::{DialogueService, FakeDialogueService, OpenAICompatibleDialogue},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        return;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

fn dialogue_service(config: &Config) -> anyhow::Result<Arc<dyn DialogueService>> {
    let (api_key, api_base) = match config.provider {
        Provider::OpenAI => (
            config
                .openai_api_key
                .as_ref()
                .context("OPENAI_API_KEY must be set for 'openai' provider")?,
            OPENAI_API_BASE,
        ),
        Provider::Gemini => (
            config
                .gemini_api_key
                .as_ref()
                .context("GEMINI_API_KEY must be set for 'gemini' provider")?,
            GEMINI_API_BASE,
        ),
        Provider::Fake => {
            info!("Using canned dialogue; no upstream calls will be made.");
            return Ok(Arc::new(FakeDialogueService::default()));
        }
    };

    info!(provider = ?config.provider, "Using OpenAI-compatible dialogue provider.");
    let openai_config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(api_base);
    Ok(Arc::new(OpenAICompatibleDialogue::new(
        openai_config,
        config.chat_model.clone(),
    )))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Shared Services ---
    let repository = Arc::new(FileLearningRepository::new(
        &config.store_root,
        &config.template_root,
    ));
    info!(store = %repository.store_dir().display(), "Queue store ready.");

    let templates = Arc::new(FileTemplateSource::new(&config.prompts_path));
    let dialogue = dialogue_service(&config)?;
    let coach = Arc::new(CoachOrchestrator::new(repository, templates, dialogue));
    let app_state = Arc::new(AppState::new(coach));

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
