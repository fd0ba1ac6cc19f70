//! Orchestrator — per-session state machine for the "predict" and "insights"
//! actions.
//!
//! The machine itself never awaits. Each action is split into a `begin_*`
//! call that hands out a ticket and a `complete_*` call that applies the
//! outcome. A ticket carries the sequence number that was current when it was
//! issued; completions whose sequence number has since moved on are stale and
//! are dropped. `Session` drives the machine around the actual network calls.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::insights::requester::{InsightError, InsightRequest};
use crate::salary::estimator::{estimate, PredictionResult};
use crate::salary::model::{non_blank, ExperienceYears, InvalidExperience};
use crate::salary::resolver::Resolution;

pub mod handlers;
pub mod session;

pub const INVALID_INPUT_LABEL: &str = "Invalid Input";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrchestratorError {
    #[error("Predict a salary before requesting insights.")]
    NoPrediction,

    #[error("Insights are already being generated.")]
    AlreadyPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Failed,
}

/// Observable state of one action: `{ isPending, data, error }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionState<T> {
    pub status: ActionStatus,
    pub is_pending: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Default for ActionState<T> {
    fn default() -> Self {
        Self {
            status: ActionStatus::Idle,
            is_pending: false,
            data: None,
            error: None,
        }
    }
}

impl<T> ActionState<T> {
    fn pending() -> Self {
        Self {
            status: ActionStatus::Pending,
            is_pending: true,
            data: None,
            error: None,
        }
    }

    fn succeeded(data: T) -> Self {
        Self {
            status: ActionStatus::Success,
            is_pending: false,
            data: Some(data),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            status: ActionStatus::Failed,
            is_pending: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Prediction slot as rendered: a real result or the terminal invalid-input marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Estimate(PredictionResult),
    InvalidInput { label: String, message: String },
}

/// Issued by `begin_prediction` when the input is valid; the caller resolves
/// coefficients for `job_role` and hands the resolution back.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictTicket {
    pub seq: u64,
    pub experience: ExperienceYears,
    pub job_role: Option<String>,
    /// Not part of the estimate; forwarded to the next insight request.
    pub education_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightTicket {
    pub seq: u64,
    pub request: InsightRequest,
}

/// Whether a completion was applied or dropped as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current,
    Stale,
}

#[derive(Debug, Default)]
pub struct Orchestrator {
    prediction: ActionState<PredictionOutcome>,
    insights: ActionState<String>,
    prediction_seq: u64,
    insight_seq: u64,
    /// Role and education behind the currently displayed prediction.
    prediction_role: Option<String>,
    prediction_education: Option<String>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prediction(&self) -> &ActionState<PredictionOutcome> {
        &self.prediction
    }

    pub fn insights(&self) -> &ActionState<String> {
        &self.insights
    }

    /// Starts a prediction from already-parsed input. Clears the previous
    /// result and any insight state, superseding requests still in flight.
    /// Invalid input is terminal: the state is set immediately and no ticket
    /// is returned.
    pub fn begin_prediction(
        &mut self,
        experience: Result<ExperienceYears, InvalidExperience>,
        job_role: Option<&str>,
        education_level: Option<&str>,
    ) -> Option<PredictTicket> {
        self.prediction_seq += 1;
        self.reset_insights();
        self.prediction_role = None;
        self.prediction_education = None;

        match experience {
            Ok(experience) => {
                self.prediction = ActionState::pending();
                Some(PredictTicket {
                    seq: self.prediction_seq,
                    experience,
                    job_role: non_blank(job_role).map(str::to_owned),
                    education_level: non_blank(education_level).map(str::to_owned),
                })
            }
            Err(e) => {
                self.prediction = ActionState {
                    status: ActionStatus::Failed,
                    is_pending: false,
                    data: Some(PredictionOutcome::InvalidInput {
                        label: INVALID_INPUT_LABEL.to_string(),
                        message: e.to_string(),
                    }),
                    error: Some(e.to_string()),
                };
                None
            }
        }
    }

    /// Applies resolved coefficients to a ticket and records the estimate.
    pub fn complete_prediction(
        &mut self,
        ticket: &PredictTicket,
        resolution: Resolution,
    ) -> Applied {
        if ticket.seq != self.prediction_seq {
            debug!(
                ticket = ticket.seq,
                latest = self.prediction_seq,
                "Discarding stale prediction"
            );
            return Applied::Stale;
        }
        let result = estimate(ticket.experience, &resolution.model, resolution.source);
        self.prediction = ActionState::succeeded(PredictionOutcome::Estimate(result));
        self.prediction_role = ticket.job_role.clone();
        self.prediction_education = ticket.education_level.clone();
        Applied::Current
    }

    /// Starts an insight fetch for the currently displayed prediction.
    pub fn begin_insights(&mut self) -> Result<InsightTicket, OrchestratorError> {
        if self.insights.is_pending {
            return Err(OrchestratorError::AlreadyPending);
        }
        let result = match (&self.prediction.status, &self.prediction.data) {
            (ActionStatus::Success, Some(PredictionOutcome::Estimate(result))) => result,
            _ => return Err(OrchestratorError::NoPrediction),
        };
        let request = InsightRequest {
            experience: result.experience.value(),
            salary: result.formatted_salary.clone(),
            job_role: self.prediction_role.clone(),
            education_level: self.prediction_education.clone(),
        };

        self.insight_seq += 1;
        self.insights = ActionState::pending();
        Ok(InsightTicket {
            seq: self.insight_seq,
            request,
        })
    }

    /// Records the outcome of an insight fetch. Always leaves the pending
    /// state when the ticket is current.
    pub fn complete_insights(
        &mut self,
        ticket: &InsightTicket,
        outcome: Result<String, InsightError>,
    ) -> Applied {
        if ticket.seq != self.insight_seq {
            debug!(
                ticket = ticket.seq,
                latest = self.insight_seq,
                "Discarding stale insights"
            );
            return Applied::Stale;
        }
        self.insights = match outcome {
            Ok(text) => ActionState::succeeded(text),
            Err(e) => ActionState::failed(format!("Sorry, an error occurred: {e}")),
        };
        Applied::Current
    }

    /// Drops insight state and invalidates any fetch still in flight.
    fn reset_insights(&mut self) {
        self.insight_seq += 1;
        self.insights = ActionState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::salary::estimator::ModelSource;
    use crate::salary::model::SalaryModel;

    fn fallback() -> Resolution {
        Resolution {
            model: SalaryModel::DEFAULT_FALLBACK,
            source: ModelSource::Fallback,
        }
    }

    fn begin(o: &mut Orchestrator, years: &str, role: Option<&str>) -> Option<PredictTicket> {
        o.begin_prediction(ExperienceYears::parse(years), role, None)
    }

    fn estimate_of(o: &Orchestrator) -> &PredictionResult {
        match o.prediction().data.as_ref() {
            Some(PredictionOutcome::Estimate(result)) => result,
            other => panic!("no estimate: {other:?}"),
        }
    }

    #[test]
    fn test_initial_state_is_idle() {
        let o = Orchestrator::new();
        assert_eq!(o.prediction().status, ActionStatus::Idle);
        assert_eq!(o.insights().status, ActionStatus::Idle);
        assert!(!o.prediction().is_pending);
    }

    #[test]
    fn test_invalid_input_is_terminal() {
        let mut o = Orchestrator::new();
        assert!(begin(&mut o, "abc", Some("Engineer")).is_none());
        let state = o.prediction();
        assert_eq!(state.status, ActionStatus::Failed);
        assert!(!state.is_pending);
        assert_eq!(
            state.data,
            Some(PredictionOutcome::InvalidInput {
                label: "Invalid Input".to_string(),
                message: "Please enter a valid number of years.".to_string(),
            })
        );
        assert!(begin(&mut o, "-3", None).is_none());
    }

    #[test]
    fn test_prediction_flow() {
        let mut o = Orchestrator::new();
        let ticket = begin(&mut o, "5", Some("  ")).unwrap();
        assert!(o.prediction().is_pending);
        assert_eq!(ticket.job_role, None);

        assert_eq!(o.complete_prediction(&ticket, fallback()), Applied::Current);
        assert_eq!(o.prediction().status, ActionStatus::Success);
        let result = estimate_of(&o);
        assert_eq!(result.formatted_salary, "$122,197.69");
        assert_eq!(result.qualitative_message, "Solid mid-level experience!");
    }

    #[test]
    fn test_stale_prediction_is_discarded() {
        let mut o = Orchestrator::new();
        let first = begin(&mut o, "1", None).unwrap();
        let second = begin(&mut o, "20", None).unwrap();

        assert_eq!(o.complete_prediction(&second, fallback()), Applied::Current);
        assert_eq!(o.complete_prediction(&first, fallback()), Applied::Stale);
        assert_eq!(estimate_of(&o).experience.value(), 20.0);
    }

    #[test]
    fn test_insights_require_prediction() {
        let mut o = Orchestrator::new();
        assert_eq!(o.begin_insights(), Err(OrchestratorError::NoPrediction));

        begin(&mut o, "x", None);
        assert_eq!(o.begin_insights(), Err(OrchestratorError::NoPrediction));

        begin(&mut o, "3", None);
        assert_eq!(o.begin_insights(), Err(OrchestratorError::NoPrediction));
    }

    #[test]
    fn test_insight_snapshot_and_completion() {
        let mut o = Orchestrator::new();
        let ticket = begin(&mut o, "5", Some("Data Analyst")).unwrap();
        o.complete_prediction(&ticket, fallback());

        let insight = o.begin_insights().unwrap();
        assert_eq!(
            insight.request,
            InsightRequest {
                experience: 5.0,
                salary: "$122,197.69".to_string(),
                job_role: Some("Data Analyst".to_string()),
                education_level: None,
            }
        );
        assert!(o.insights().is_pending);
        assert_eq!(o.begin_insights(), Err(OrchestratorError::AlreadyPending));

        o.complete_insights(&insight, Ok("## Advice".to_string()));
        assert_eq!(o.insights().status, ActionStatus::Success);
        assert_eq!(o.insights().data.as_deref(), Some("## Advice"));
        assert!(!o.insights().is_pending);
    }

    #[test]
    fn test_education_level_reaches_insight_request() {
        let mut o = Orchestrator::new();
        let ticket = o
            .begin_prediction(ExperienceYears::parse("8"), Some("Chef"), Some(" PhD "))
            .unwrap();
        assert_eq!(ticket.education_level.as_deref(), Some("PhD"));
        o.complete_prediction(&ticket, fallback());

        let insight = o.begin_insights().unwrap();
        assert_eq!(insight.request.education_level.as_deref(), Some("PhD"));

        let ticket = o.begin_prediction(ExperienceYears::parse("8"), None, Some("")).unwrap();
        o.complete_prediction(&ticket, fallback());
        assert_eq!(o.begin_insights().unwrap().request.education_level, None);
    }

    #[test]
    fn test_insight_failure_message_embeds_detail() {
        let mut o = Orchestrator::new();
        let ticket = begin(&mut o, "5", None).unwrap();
        o.complete_prediction(&ticket, fallback());
        let insight = o.begin_insights().unwrap();

        o.complete_insights(
            &insight,
            Err(InsightError::Upstream {
                status: 500,
                body: "boom".into(),
            }),
        );
        let state = o.insights();
        assert_eq!(state.status, ActionStatus::Failed);
        assert!(!state.is_pending);
        assert_eq!(state.data, None);
        assert_eq!(
            state.error.as_deref(),
            Some("Sorry, an error occurred: Gemini API error: boom")
        );
    }

    #[test]
    fn test_new_prediction_clears_and_invalidates_insights() {
        let mut o = Orchestrator::new();
        let ticket = begin(&mut o, "5", None).unwrap();
        o.complete_prediction(&ticket, fallback());
        let insight = o.begin_insights().unwrap();

        let next = begin(&mut o, "6", None).unwrap();
        assert_eq!(o.insights(), &ActionState::default());
        assert!(o.prediction().data.is_none());

        assert_eq!(o.complete_insights(&insight, Ok("old".into())), Applied::Stale);
        assert_eq!(o.insights().data, None);

        o.complete_prediction(&next, fallback());
        assert!(o.begin_insights().is_ok());
    }
}
