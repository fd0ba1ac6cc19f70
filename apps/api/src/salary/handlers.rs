//! Axum route handlers for the salary endpoints.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::salary::estimator::{estimate, PredictionResult};
use crate::salary::model::{ExperienceInput, ExperienceYears, InvalidExperience, SalaryModel};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryModelRequest {
    #[serde(default)]
    pub job_role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    #[serde(default)]
    pub experience: Option<ExperienceInput>,
    #[serde(default)]
    pub job_role: Option<String>,
    /// Accepted for the insight flow; the linear estimate ignores it.
    #[serde(default)]
    pub education_level: Option<String>,
}

impl PredictRequest {
    pub fn experience_years(&self) -> Result<ExperienceYears, InvalidExperience> {
        self.experience
            .as_ref()
            .ok_or(InvalidExperience)
            .and_then(ExperienceInput::to_years)
    }
}

/// POST /api/get-salary-model
///
/// Strict coefficient lookup for a role. Unlike the predict flow this does
/// not fall back: callers see the failure and decide for themselves.
pub async fn handle_get_salary_model(
    State(state): State<AppState>,
    Json(request): Json<SalaryModelRequest>,
) -> Result<Json<SalaryModel>, AppError> {
    let role = request.job_role.as_deref().unwrap_or_default();
    let model = state.resolver.try_resolve(role).await?;
    Ok(Json(model))
}

/// POST /api/predict
///
/// Stateless prediction: validate, resolve (with fallback), estimate.
pub async fn handle_predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictionResult>, AppError> {
    let experience = request.experience_years()?;
    let resolution = state.resolver.resolve(request.job_role.as_deref()).await;
    Ok(Json(estimate(experience, &resolution.model, resolution.source)))
}
