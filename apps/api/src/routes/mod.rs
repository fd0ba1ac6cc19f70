pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::insights::handlers as insights;
use crate::orchestrator::handlers as sessions;
use crate::salary::handlers as salary;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless API
        .route("/api/get-salary-model", post(salary::handle_get_salary_model))
        .route("/api/predict", post(salary::handle_predict))
        .route("/api/get-insights", post(insights::handle_get_insights))
        // Session API
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/predict",
            post(sessions::handle_session_predict),
        )
        .route(
            "/api/v1/sessions/:id/insights",
            post(sessions::handle_session_insights),
        )
        .with_state(state)
}
