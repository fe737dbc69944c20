//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::FullRepository;
use crate::services::ImpactAnalysisService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for history reads and health checks
    pub repository: Arc<dyn FullRepository>,
    pub analysis: ImpactAnalysisService,
}

impl AppState {
    pub fn new(analysis: ImpactAnalysisService) -> Self {
        Self {
            repository: Arc::clone(analysis.repository()),
            analysis,
        }
    }
}
