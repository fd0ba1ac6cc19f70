//! Insight Requester — turns a prediction into an advisory prompt and returns
//! the model's markdown verbatim.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::insights::prompts::{
    EDUCATION_CONTEXT_TEMPLATE, GENERIC_INSIGHT_PROMPT_TEMPLATE, ROLE_INSIGHT_PROMPT_TEMPLATE,
};
use crate::llm_client::prompts::TONE_INSTRUCTION;
use crate::llm_client::{LlmError, TextGenerator};
use crate::salary::model::non_blank;

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("API key is not configured.")]
    Configuration,

    #[error("Gemini API error: {body}")]
    Upstream { status: u16, body: String },

    #[error("Could not reach Gemini: {0}")]
    Transport(String),

    #[error("An internal server error occurred.")]
    Internal,
}

impl From<LlmError> for InsightError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingApiKey => InsightError::Configuration,
            LlmError::Api { status, message } => InsightError::Upstream {
                status,
                body: message,
            },
            LlmError::Http(e) => InsightError::Transport(e.to_string()),
            other => {
                error!("Unexpected insight response shape: {other}");
                InsightError::Internal
            }
        }
    }
}

/// Snapshot of the prediction an insight is requested for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightRequest {
    pub experience: f64,
    /// Already formatted, e.g. `$100,000.00`.
    pub salary: String,
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub education_level: Option<String>,
}

pub struct InsightRequester {
    llm: Arc<dyn TextGenerator>,
    model_name: String,
}

impl InsightRequester {
    pub fn new(llm: Arc<dyn TextGenerator>, model_name: impl Into<String>) -> Self {
        Self {
            llm,
            model_name: model_name.into(),
        }
    }

    /// Default generation settings: prose benefits from the model's own sampling.
    pub async fn request_insights(&self, request: &InsightRequest) -> Result<String, InsightError> {
        let prompt = build_insight_prompt(request);
        let text = self.llm.generate(&self.model_name, &prompt, None).await?;
        Ok(text)
    }
}

pub fn build_insight_prompt(request: &InsightRequest) -> String {
    let role = non_blank(request.job_role.as_deref());
    let template = match role {
        Some(_) => ROLE_INSIGHT_PROMPT_TEMPLATE,
        None => GENERIC_INSIGHT_PROMPT_TEMPLATE,
    };
    let education = match non_blank(request.education_level.as_deref()) {
        Some(level) => EDUCATION_CONTEXT_TEMPLATE.replace("{education_level}", level),
        None => String::new(),
    };
    template
        .replace("{tone}", TONE_INSTRUCTION)
        .replace("{experience}", &request.experience.to_string())
        .replace("{salary}", &request.salary)
        .replace("{job_role}", role.unwrap_or_default())
        .replace("{education}", &education)
}
