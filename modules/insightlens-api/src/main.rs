use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use insightlens_common::AppConfig;
use insightlens_search::Aggregator;
use insightlens_store::InsightStore;

mod rest;

pub struct AppState {
    pub aggregator: Aggregator,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("insightlens=info".parse()?))
        .init();

    let config = AppConfig::from_env()?;

    // The one fatal failure point: an unwritable storage location should
    // stop the process, everything after this degrades per source.
    let store = InsightStore::connect(&config.database_path).await?;
    info!(path = %config.database_path, "Store ready");

    let state = Arc::new(AppState {
        aggregator: Aggregator::from_config(&config, store),
    });

    let app = Router::new()
        .route("/health", get(rest::health))
        .route("/ingest", post(rest::ingest))
        .route("/search", get(rest::search))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        );

    let addr = format!("{}:{}", config.host, config.port);
    info!(addr, "InsightLens API listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
