//! Axum route handlers for session-scoped orchestration.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::orchestrator::session::{Session, SessionSnapshot};
use crate::salary::handlers::PredictRequest;
use crate::state::AppState;

async fn find_session(state: &AppState, id: Uuid) -> Result<std::sync::Arc<Session>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(session.snapshot().await))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = find_session(&state, id).await?;
    Ok(Json(session.snapshot().await))
}

/// POST /api/v1/sessions/:id/predict
///
/// Invalid experience is a terminal state of the session, not an HTTP error:
/// the snapshot carries the `Invalid Input` outcome.
pub async fn handle_session_predict(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = find_session(&state, id).await?;
    let snapshot = session
        .predict(
            &state.resolver,
            request.experience_years(),
            request.job_role.as_deref(),
            request.education_level.as_deref(),
        )
        .await;
    Ok(Json(snapshot))
}

/// POST /api/v1/sessions/:id/insights
pub async fn handle_session_insights(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = find_session(&state, id).await?;
    let snapshot = session.fetch_insights(&state.insights).await?;
    Ok(Json(snapshot))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}
