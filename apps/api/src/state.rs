use std::sync::Arc;

use crate::config::Config;
use crate::layout::FontResolver;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Font search list, fixed at startup. Fonts themselves are loaded per request.
    pub fonts: Arc<FontResolver>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let fonts = Arc::new(FontResolver::new(config.font_candidates.clone()));
        Self { config, fonts }
    }
}
