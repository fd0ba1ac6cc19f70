//! Coefficient Resolver — asks the model for a role-specific `(base, slope)`
//! pair and falls back to the configured model whenever that is impossible.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{GenerationConfig, LlmError, TextGenerator};
use crate::salary::estimator::ModelSource;
use crate::salary::model::{non_blank, ParseError, SalaryModel};
use crate::salary::prompts::COEFFICIENT_PROMPT_TEMPLATE;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Job role is required.")]
    MissingRole,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Invalid coefficient reply: {0}")]
    Parse(#[from] ParseError),
}

/// A resolved model together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub model: SalaryModel,
    pub source: ModelSource,
}

pub struct CoefficientResolver {
    llm: Arc<dyn TextGenerator>,
    model_name: String,
    fallback: SalaryModel,
}

impl CoefficientResolver {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        model_name: impl Into<String>,
        fallback: SalaryModel,
    ) -> Self {
        Self {
            llm,
            model_name: model_name.into(),
            fallback,
        }
    }

    pub fn fallback(&self) -> SalaryModel {
        self.fallback
    }

    /// Never fails: any problem yields the fallback model.
    pub async fn resolve(&self, job_role: Option<&str>) -> Resolution {
        let Some(role) = non_blank(job_role) else {
            return self.fallback_resolution();
        };

        match self.try_resolve(role).await {
            Ok(model) => {
                info!(role, base = model.base, slope = model.slope, "Resolved salary coefficients");
                Resolution {
                    model,
                    source: ModelSource::Remote,
                }
            }
            Err(e) => {
                warn!(role, "Coefficient lookup failed, using fallback model: {e}");
                self.fallback_resolution()
            }
        }
    }

    /// Strict lookup: one model call, decoded into a validated `SalaryModel`.
    pub async fn try_resolve(&self, job_role: &str) -> Result<SalaryModel, ResolveError> {
        let role = non_blank(Some(job_role)).ok_or(ResolveError::MissingRole)?;
        let prompt = build_coefficient_prompt(role);
        let reply = self
            .llm
            .generate(&self.model_name, &prompt, Some(GenerationConfig::DETERMINISTIC))
            .await?;
        Ok(SalaryModel::decode_reply(&reply)?)
    }

    fn fallback_resolution(&self) -> Resolution {
        Resolution {
            model: self.fallback,
            source: ModelSource::Fallback,
        }
    }
}

pub fn build_coefficient_prompt(job_role: &str) -> String {
    // Fill the fixed fragment first so a role can never inject a placeholder.
    COEFFICIENT_PROMPT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{job_role}", job_role)
}
