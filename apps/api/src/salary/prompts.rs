// LLM prompt templates for the coefficient lookup.

/// Coefficient prompt. Replace `{job_role}` and `{json_only}` before sending.
pub const COEFFICIENT_PROMPT_TEMPLATE: &str = r#"For the job title "{job_role}", provide a realistic estimated starting salary (base)
and an average annual salary increase (slope) in the United States.

Respond ONLY with a valid JSON object in the format:
{"base": NUMBER, "slope": NUMBER}

{json_only}"#;
