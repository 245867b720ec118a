mod config;
mod errors;
mod jobs;
mod models;
mod routes;
mod sources;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::jobs::aggregator::Aggregator;
use crate::jobs::classifier::{Classifier, Vocabulary};
use crate::routes::build_router;
use crate::sources::default_sources;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Board API v{}", env!("CARGO_PKG_VERSION"));

    // One HTTP client shared by every source adapter
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let sources = default_sources(client, &config);
    let aggregator = Aggregator::new(sources);
    info!(
        "Registered sources: {} (default ordering: {:?})",
        aggregator.source_keys().join(", "),
        config.default_ordering
    );

    let state = AppState {
        config: config.clone(),
        aggregator: Arc::new(aggregator),
        classifier: Arc::new(Classifier::new(Vocabulary::default())),
    };

    // Browser front ends on other origins call the query surface directly
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
