use std::sync::Arc;

use agrosnap::config::Config;
use agrosnap::AppState;
use anyhow::Context;
use reqwest::Client;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    let port = config.port;

    if config.google_api_key.is_none() {
        warn!("GOOGLE_API_KEY not set; diagnosis and translation calls will fail");
    }
    if config.mandi_api_key.is_none() {
        warn!("DATA_GOV_IN_API_KEY not set; mandi price lookups will fail");
    }
    info!("Using model {}", config.gemini_model);

    let client = Client::builder()
        .build()
        .context("Failed to create HTTP client")?;

    let state = Arc::new(AppState::new(config, client)?);
    info!("Loaded {} dashboard labels", state.labels.len());

    let app = agrosnap::router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
