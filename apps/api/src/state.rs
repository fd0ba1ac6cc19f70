use std::sync::Arc;

use crate::config::Config;
use crate::insights::requester::InsightRequester;
use crate::llm_client::TextGenerator;
use crate::orchestrator::session::SessionStore;
use crate::salary::resolver::CoefficientResolver;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub resolver: Arc<CoefficientResolver>,
    pub insights: Arc<InsightRequester>,
    pub sessions: SessionStore,
}

impl AppState {
    /// Wires both services to the same generator.
    pub fn new(config: Config, llm: Arc<dyn TextGenerator>, sessions: SessionStore) -> Self {
        let resolver = CoefficientResolver::new(
            Arc::clone(&llm),
            config.coefficient_model.clone(),
            config.fallback_model,
        );
        let insights = InsightRequester::new(llm, config.insight_model.clone());
        Self {
            config,
            resolver: Arc::new(resolver),
            insights: Arc::new(insights),
            sessions,
        }
    }
}
