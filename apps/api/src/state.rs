use std::sync::Arc;

use crate::config::Config;
use crate::extraction::rules::ExtractionRules;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Loaded once at startup; read-only afterwards.
    pub rules: Arc<ExtractionRules>,
}
