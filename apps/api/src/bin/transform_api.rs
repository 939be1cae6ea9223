//! Entry point for the job-transformation service.

use std::net::SocketAddr;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skillpulse::config::Config;
use skillpulse::db::create_pool;
use skillpulse::llm_client::LlmClient;
use skillpulse::routes::transform_router;
use skillpulse::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env(8000)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting SkillPulse transform API v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db = create_pool(&config.database_url)?;

    let llm = LlmClient::new(&config);
    info!(
        "LLM client initialized (model: {}, endpoint: {})",
        config.llm_model, config.llm_base_url
    );

    let state = AppState {
        db,
        llm,
        config: config.clone(),
    };

    let app = transform_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // frontend runs on a separate origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
