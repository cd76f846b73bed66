mod config;
mod errors;
mod generation;
mod llm_client;
mod models;
mod profiles;
mod render;
mod routes;
mod sandbox;
mod state;
mod themes;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::ThemeGenerator;
use crate::llm_client::{HttpTransport, LlmClient};
use crate::profiles::ProfileStore;
use crate::render::{AccentChannel, Renderer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::themes::ThemeRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Theme registry and accent channel
    let registry = Arc::new(ThemeRegistry::new(&config.default_theme));
    let accent = AccentChannel::new(&config.default_accent)?;
    info!(
        "Theme registry ready: {} themes, default '{}', accent {}",
        registry.keys().len(),
        registry.default_key(),
        accent.current()
    );

    // Sample profiles
    let profiles = Arc::new(ProfileStore::load_dir(&config.profiles_dir)?);

    // Initialize LLM client (optional: generation is disabled without a key)
    let llm = match config.llm_api_key.clone() {
        Some(api_key) => {
            let transport = HttpTransport::from_config(&config, api_key)?;
            let llm = LlmClient::new(Arc::new(transport), config.completion_options());
            info!("LLM client initialized (model: {})", llm.model());
            Some(llm)
        }
        None => {
            warn!("No LLM_API_KEY or OPENROUTER_API_KEY set; theme generation will be rejected");
            None
        }
    };

    let generator = Arc::new(ThemeGenerator::new(
        llm,
        registry.clone(),
        config.sandbox_limits(),
    ));

    // Build app state
    let state = AppState {
        config: config.clone(),
        renderer: Renderer::new(registry.clone(), &accent),
        registry,
        generator,
        accent,
        profiles,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
