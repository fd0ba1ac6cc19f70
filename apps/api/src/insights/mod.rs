// Career insights: prompt construction and the Gemini round-trip.
// All LLM calls go through llm_client.

pub mod handlers;
pub mod prompts;
pub mod requester;
