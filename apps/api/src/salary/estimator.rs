//! Salary Estimator — pure linear estimate, currency formatting, and tiering.

use serde::Serialize;

use crate::salary::model::{ExperienceYears, SalaryModel};

/// Qualitative experience band. Lower bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceTier {
    EarlyCareer, // <= 2
    MidLevel,    // (2, 10]
    Senior,      // (10, 40]
    Exceptional, // > 40
}

impl ExperienceTier {
    pub fn for_years(years: ExperienceYears) -> Self {
        let years = years.value();
        if years > 40.0 {
            ExperienceTier::Exceptional
        } else if years > 10.0 {
            ExperienceTier::Senior
        } else if years > 2.0 {
            ExperienceTier::MidLevel
        } else {
            ExperienceTier::EarlyCareer
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ExperienceTier::EarlyCareer => "Just getting started on your journey!",
            ExperienceTier::MidLevel => "Solid mid-level experience!",
            ExperienceTier::Senior => "A true senior professional!",
            ExperienceTier::Exceptional => "Incredible experience!",
        }
    }
}

/// Where the coefficients behind a prediction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub formatted_salary: String,
    pub qualitative_message: String,
    pub salary: f64,
    pub experience: ExperienceYears,
    pub tier: ExperienceTier,
    pub model: SalaryModel,
    pub model_source: ModelSource,
}

/// Computes `base + slope * years` and its presentation.
pub fn estimate(
    experience: ExperienceYears,
    model: &SalaryModel,
    model_source: ModelSource,
) -> PredictionResult {
    let salary = model.salary_at(experience);
    let tier = ExperienceTier::for_years(experience);
    PredictionResult {
        formatted_salary: format_usd(salary),
        qualitative_message: tier.message().to_string(),
        salary,
        experience,
        tier,
        model: *model,
        model_source,
    }
}

/// Largest magnitude whose cent count is still exactly representable.
const EXACT_CENTS_LIMIT: f64 = 9_007_199_254_740_992.0 / 100.0;

/// Formats an amount as US dollars: `$1,234.56`, `$-12.00`, `$∞`.
pub fn format_usd(amount: f64) -> String {
    if amount.is_nan() {
        return "$NaN".to_string();
    }
    let magnitude = amount.abs();
    if magnitude.is_infinite() {
        let sign = if amount < 0.0 { "-" } else { "" };
        return format!("${sign}∞");
    }

    let (dollars, fraction) = if magnitude < EXACT_CENTS_LIMIT {
        let cents = (magnitude * 100.0).round() as u64;
        ((cents / 100).to_string(), cents % 100)
    } else {
        // No sub-dollar precision left at this size.
        (format!("{magnitude:.0}"), 0)
    };

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = dollars == "0" && fraction == 0;
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };
    format!("${sign}{grouped}.{fraction:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years(v: f64) -> ExperienceYears {
        ExperienceYears::new(v).unwrap()
    }

    #[test]
    fn test_format_usd_grouping() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(999.5), "$999.50");
        assert_eq!(format_usd(1000.0), "$1,000.00");
        assert_eq!(format_usd(64790.69), "$64,790.69");
        assert_eq!(format_usd(1234567.891), "$1,234,567.89");
    }

    #[test]
    fn test_format_usd_rounding_and_sign() {
        assert_eq!(format_usd(0.125), "$0.13");
        assert_eq!(format_usd(-1500.0), "$-1,500.00");
        assert_eq!(format_usd(-0.001), "$0.00");
    }

    #[test]
    fn test_format_usd_beyond_cent_precision() {
        assert_eq!(format_usd(1e20), "$100,000,000,000,000,000,000.00");
        assert_eq!(format_usd(-1e16), "$-10,000,000,000,000,000.00");
        assert_eq!(format_usd(f64::INFINITY), "$∞");
        assert_eq!(format_usd(f64::NEG_INFINITY), "$-∞");
    }

    #[test]
    fn test_estimate_overflowing_experience_is_not_truncated() {
        let experience = ExperienceYears::parse("1e308").unwrap();
        let result = estimate(experience, &SalaryModel::DEFAULT_FALLBACK, ModelSource::Fallback);
        assert!(result.salary.is_infinite());
        assert_eq!(result.formatted_salary, "$∞");
        assert_eq!(result.tier, ExperienceTier::Exceptional);
    }

    #[test]
    fn test_estimate_negative_total_keeps_symbol_first() {
        let model = SalaryModel::new(-1500.0, 0.0).unwrap();
        let result = estimate(years(1.0), &model, ModelSource::Remote);
        assert_eq!(result.formatted_salary, "$-1,500.00");
    }

    #[test]
    fn test_estimate_is_linear() {
        let model = SalaryModel::new(50000.0, 2500.0).unwrap();
        let result = estimate(years(4.0), &model, ModelSource::Remote);
        assert_eq!(result.salary, 60000.0);
        assert_eq!(result.formatted_salary, "$60,000.00");
        assert_eq!(result.model_source, ModelSource::Remote);
    }

    #[test]
    fn test_estimate_fallback_five_years() {
        let result = estimate(years(5.0), &SalaryModel::DEFAULT_FALLBACK, ModelSource::Fallback);
        assert_eq!(result.formatted_salary, "$122,197.69");
        assert_eq!(result.tier, ExperienceTier::MidLevel);
        assert_eq!(result.qualitative_message, "Solid mid-level experience!");
    }

    #[test]
    fn test_estimate_zero_years_is_base() {
        let result = estimate(years(0.0), &SalaryModel::DEFAULT_FALLBACK, ModelSource::Fallback);
        assert_eq!(result.formatted_salary, "$64,790.69");
        assert_eq!(result.tier, ExperienceTier::EarlyCareer);
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let model = SalaryModel::new(81000.0, 3333.33).unwrap();
        let a = estimate(years(7.3), &model, ModelSource::Remote);
        let b = estimate(years(7.3), &model, ModelSource::Remote);
        assert_eq!(a, b);
    }

    #[test]
    fn test_tier_boundaries() {
        let cases = [
            (0.0, ExperienceTier::EarlyCareer),
            (2.0, ExperienceTier::EarlyCareer),
            (2.01, ExperienceTier::MidLevel),
            (10.0, ExperienceTier::MidLevel),
            (10.01, ExperienceTier::Senior),
            (40.0, ExperienceTier::Senior),
            (40.01, ExperienceTier::Exceptional),
        ];
        for (value, expected) in cases {
            assert_eq!(ExperienceTier::for_years(years(value)), expected, "years = {value}");
        }
    }

    #[test]
    fn test_prediction_serializes_camel_case() {
        let result = estimate(years(12.0), &SalaryModel::DEFAULT_FALLBACK, ModelSource::Fallback);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["qualitativeMessage"], "A true senior professional!");
        assert_eq!(value["tier"], "senior");
        assert_eq!(value["modelSource"], "fallback");
        assert_eq!(value["experience"], 12.0);
    }
}
