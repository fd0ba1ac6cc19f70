use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::insights::requester::InsightRequest;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: String,
}

/// POST /api/get-insights
pub async fn handle_get_insights(
    State(state): State<AppState>,
    Json(request): Json<InsightRequest>,
) -> Result<Json<InsightsResponse>, AppError> {
    let insights = state.insights.request_insights(&request).await?;
    Ok(Json(InsightsResponse { insights }))
}
