//! Axum API server binary.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vsearch_api::{create_router, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("vsearch=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting vsearch-api");

    let config = ApiConfig::from_env();
    info!(
        "API config: host={}, port={}, media_dir={}",
        config.host,
        config.port,
        config.media_dir.display()
    );

    // The pipeline shells out to both tools; refuse to start without them.
    vsearch_media::check_ffmpeg().context("ffmpeg is required on PATH")?;
    vsearch_media::check_ffprobe().context("ffprobe is required on PATH")?;

    tokio::fs::create_dir_all(&config.media_dir)
        .await
        .with_context(|| format!("creating media dir {}", config.media_dir.display()))?;

    if config.is_production() && !use_json {
        warn!("Production environment without JSON logs; set LOG_FORMAT=json");
    }

    let state = AppState::new(config.clone());
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid bind address")?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Received shutdown signal");
}
