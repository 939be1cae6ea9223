//! Entry point for the career-advice service.

use std::net::SocketAddr;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skillpulse::config::Config;
use skillpulse::db::create_pool;
use skillpulse::llm_client::LlmClient;
use skillpulse::routes::advice_router;
use skillpulse::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env(8001)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting SkillPulse advice API v{} (model: {}, endpoint: {})",
        env!("CARGO_PKG_VERSION"),
        config.llm_model,
        config.llm_base_url
    );

    let db = create_pool(&config.database_url)?;

    let llm = LlmClient::new(&config);
    // Startup probe only; endpoints report their own failures.
    match llm.list_models().await {
        Ok(_) => info!("LLM backend reachable"),
        Err(e) => warn!("LLM backend not reachable yet ({e}); endpoints will fail until it is up"),
    }

    let state = AppState {
        db,
        llm,
        config: config.clone(),
    };

    let app = advice_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // frontend runs on a separate origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
