// LLM prompt templates for career insights.
// Placeholders: {experience}, {salary}, {job_role}, {education}, {tone}

pub const ROLE_INSIGHT_PROMPT_TEMPLATE: &str = r#"You are a helpful and insightful career advisor. A person with {experience} years of experience, a predicted salary of {salary}, is specifically interested in the role of a "{job_role}".

Based on current industry trends for this role, provide some brief, actionable career insights. Include the following sections with markdown formatting:

1.  **Current Trend Analysis:** Briefly describe the current demand or trend for a "{job_role}". Is it growing? What's the outlook?
2.  **Key Skills to Develop:** List 2-3 essential skills they should focus on right now to excel as a "{job_role}".
3.  **Potential Next Steps:** Suggest one or two potential career advancements or specializations from this role.

{education}{tone}"#;

pub const GENERIC_INSIGHT_PROMPT_TEMPLATE: &str = r#"You are a helpful and encouraging career advisor. A person with {experience} years of professional experience has a predicted salary of {salary}. Based on this, provide some brief career insights. Include the following sections with markdown formatting:

1.  **Possible Job Titles:** Suggest 2-3 typical job titles for this experience level.
2.  **Key Skills to Develop:** List 2-3 important skills they should focus on for career growth.
3.  **Potential Next Steps:** Suggest one or two potential next steps in their career path.

{education}{tone}"#;

/// Inserted at `{education}` when an education level is known.
pub const EDUCATION_CONTEXT_TEMPLATE: &str =
    "Their highest level of education is \"{education_level}\"; take it into account.\n\n";
