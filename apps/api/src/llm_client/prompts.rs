// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// Appended to prompts whose reply is decoded as JSON.
pub const JSON_ONLY_INSTRUCTION: &str =
    "Do not include any other text, explanation, or markdown formatting.";

/// Closing instruction for every advisory (prose) prompt.
pub const TONE_INSTRUCTION: &str = "Keep the tone positive and the response concise.";
