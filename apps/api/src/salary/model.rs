//! Core salary data types: the linear model and validated experience input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::strip_json_fences;

/// Why a model reply could not be turned into a `SalaryModel`.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("reply is empty")]
    Empty,

    #[error("reply is not a {{\"base\", \"slope\"}} object: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field '{field}' is not a finite number")]
    NonFinite { field: &'static str },
}

/// Linear salary model: `salary = base + slope * years`.
///
/// Both fields are always finite; construct through `new` or `decode_reply`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalaryModel {
    pub base: f64,
    pub slope: f64,
}

#[derive(Deserialize)]
struct RawSalaryModel {
    base: f64,
    slope: f64,
}

impl SalaryModel {
    /// Used when no role is given or the remote lookup fails.
    pub const DEFAULT_FALLBACK: SalaryModel = SalaryModel {
        base: 64790.69,
        slope: 11481.40,
    };

    pub fn new(base: f64, slope: f64) -> Result<Self, ParseError> {
        if !base.is_finite() {
            return Err(ParseError::NonFinite { field: "base" });
        }
        if !slope.is_finite() {
            return Err(ParseError::NonFinite { field: "slope" });
        }
        Ok(Self { base, slope })
    }

    /// Decodes a model reply that should contain only `{"base": N, "slope": N}`,
    /// possibly wrapped in a markdown code fence.
    pub fn decode_reply(text: &str) -> Result<Self, ParseError> {
        let json = strip_json_fences(text);
        if json.is_empty() {
            return Err(ParseError::Empty);
        }
        let raw: RawSalaryModel = serde_json::from_str(json)?;
        Self::new(raw.base, raw.slope)
    }

    pub fn salary_at(&self, years: ExperienceYears) -> f64 {
        self.base + self.slope * years.value()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Please enter a valid number of years.")]
pub struct InvalidExperience;

/// Years of professional experience: finite and never negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ExperienceYears(f64);

impl ExperienceYears {
    pub fn new(value: f64) -> Result<Self, InvalidExperience> {
        if value.is_finite() && value >= 0.0 {
            // normalise -0.0
            Ok(Self(value + 0.0))
        } else {
            Err(InvalidExperience)
        }
    }

    /// Parses free-form user input such as `"5"` or `" 5.5 "`.
    pub fn parse(raw: &str) -> Result<Self, InvalidExperience> {
        let value: f64 = raw.trim().parse().map_err(|_| InvalidExperience)?;
        Self::new(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Experience as it arrives in a JSON body: a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExperienceInput {
    Number(f64),
    Text(String),
}

impl ExperienceInput {
    pub fn to_years(&self) -> Result<ExperienceYears, InvalidExperience> {
        match self {
            ExperienceInput::Number(n) => ExperienceYears::new(*n),
            ExperienceInput::Text(s) => ExperienceYears::parse(s),
        }
    }
}

/// Treats an empty or whitespace-only value (role, education level) as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
