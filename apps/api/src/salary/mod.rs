// Salary estimation: linear model types, the pure estimator, and the
// coefficient resolver that asks the LLM for role-specific coefficients.

pub mod estimator;
pub mod handlers;
pub mod model;
pub mod prompts;
pub mod resolver;
