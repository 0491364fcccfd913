mod config;
mod errors;
mod extraction;
mod rework;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::rules::ExtractionRules;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rework API v{}", env!("CARGO_PKG_VERSION"));

    let rules = load_rules(&config)?;
    info!(
        "Extraction rules loaded: {} section families, {} action verbs",
        rules.section_families.len(),
        rules.action_verbs.len()
    );

    let state = AppState {
        config: config.clone(),
        rules: Arc::new(rules),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Built-in rules unless `EXTRACTION_RULES_PATH` names an override file.
fn load_rules(config: &Config) -> Result<ExtractionRules> {
    match &config.extraction_rules_path {
        Some(path) => {
            info!("Loading extraction rules from {path}");
            ExtractionRules::from_path(path)
                .with_context(|| format!("Failed to load extraction rules from '{path}'"))
        }
        None => Ok(ExtractionRules::default()),
    }
}
