use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::insights::requester::InsightError;
use crate::orchestrator::OrchestratorError;
use crate::salary::model::InvalidExperience;
use crate::salary::resolver::ResolveError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The model endpoint answered with a non-success status.
    #[error("Upstream error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("LLM error: {0}")]
    Llm(String),
}

impl From<InvalidExperience> for AppError {
    fn from(e: InvalidExperience) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<InsightError> for AppError {
    fn from(e: InsightError) -> Self {
        match e {
            InsightError::Configuration => {
                AppError::Configuration("API key is not configured.".to_string())
            }
            InsightError::Upstream { status, body } => AppError::Upstream { status, body },
            InsightError::Transport(msg) => AppError::Llm(msg),
            InsightError::Internal => AppError::Llm("malformed insight response".to_string()),
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::MissingRole => AppError::Validation("Job role is required.".to_string()),
            ResolveError::Llm(crate::llm_client::LlmError::MissingApiKey) => {
                AppError::Configuration("API key is not configured.".to_string())
            }
            // The coefficient endpoint never forwards upstream statuses.
            other => AppError::Llm(format!("Coefficient lookup failed: {other}")),
        }
    }
}

impl From<OrchestratorError> for AppError {
    fn from(e: OrchestratorError) -> Self {
        AppError::Conflict(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::Upstream { status, body } => {
                tracing::error!("Gemini API returned {status}: {body}");
                (
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                    "UPSTREAM_ERROR",
                    format!("Gemini API error: {body}"),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
