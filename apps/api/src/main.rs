mod clients;
mod config;
mod errors;
mod pipeline;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clients::{FirecrawlClient, OpenAiClient, SupabaseAudit};
use crate::config::Config;
use crate::pipeline::extract::PdfTextExtractor;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer API v{}", env!("CARGO_PKG_VERSION"));

    // Missing secrets are surfaced per-request as configuration errors;
    // flag them at startup so operators see the gap before traffic does.
    if config.generation_api_key.is_none() {
        warn!("GENERATION_API_KEY is not set — analysis requests will fail with a configuration error");
    }
    if config.firecrawl_api_key.is_none() {
        warn!("FIRECRAWL_API_KEY is not set — job URL scraping will fail with a configuration error");
    }
    if config.supabase_url.is_none() || config.supabase_anon_key.is_none() {
        warn!("Supabase audit store is not configured — cover letter audit logging is disabled");
    }

    // Initialize capability clients (one handle each, shared across requests)
    let generation = OpenAiClient::new(
        config.generation_base_url.clone(),
        config.generation_api_key.clone(),
        config.generation_model.clone(),
    );
    info!(
        "Generation client initialized (model: {})",
        config.generation_model
    );

    let scraper = FirecrawlClient::new(config.firecrawl_api_key.clone());
    info!("Scraping client initialized");

    let audit = SupabaseAudit::new(config.supabase_url.clone(), config.supabase_anon_key.clone());

    // Build app state
    let state = AppState {
        extractor: Arc::new(PdfTextExtractor),
        generation: Arc::new(generation),
        scraper: Arc::new(scraper),
        audit: Arc::new(audit),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
