//! Impact analysis HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Local (in-memory) repository, rule engine only
//! cargo run --bin impact-server
//!
//! # With the external ML predictor
//! IMPACT_PREDICTOR_ENABLED=true IMPACT_PREDICTOR_URL=http://localhost:8000 \
//!   cargo run --bin impact-server --features ml-client
//! ```
//!
//! # Environment Variables
//!
//! - `HOST` / `PORT`: bind address (default: 0.0.0.0:8080)
//! - `IMPACT_*`, `REPOSITORY_TYPE`: see `idro_impact::config`
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use idro_impact::config::ImpactConfig;
use idro_impact::db::RepositoryFactory;
use idro_impact::http::{create_router, AppState};
use idro_impact::predictor::{DisabledPredictor, ExternalPredictor};
use idro_impact::services::ImpactAnalysisService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting impact analysis server");

    let config = ImpactConfig::load()?;
    let repository = RepositoryFactory::create(config.repository_type()?)?;
    info!("Repository initialized ({})", config.repository.repo_type);

    let predictor = build_predictor(&config)?;
    info!(
        "Predictor: {} (timeout {} ms), max concurrency {}",
        predictor.name(),
        config.analysis.predictor_timeout_ms,
        config.analysis.max_concurrency
    );

    let service = ImpactAnalysisService::from_config(&config, repository, predictor);
    let app = create_router(AppState::new(service));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "ml-client")]
fn build_predictor(config: &ImpactConfig) -> anyhow::Result<Arc<dyn ExternalPredictor>> {
    match config.predictor_url() {
        Some(url) if config.predictor.enabled => {
            let predictor = idro_impact::predictor::HttpPredictor::new(
                url,
                config.analysis.predictor_timeout(),
            )?;
            info!("Using ML predictor at {}", predictor.endpoint());
            Ok(Arc::new(predictor))
        }
        _ => Ok(Arc::new(DisabledPredictor)),
    }
}

#[cfg(not(feature = "ml-client"))]
fn build_predictor(config: &ImpactConfig) -> anyhow::Result<Arc<dyn ExternalPredictor>> {
    if config.predictor.enabled {
        tracing::warn!("Predictor enabled in configuration but built without `ml-client`; using rule engine only");
    }
    Ok(Arc::new(DisabledPredictor))
}
