// Career exploration: profile context, prompt templates, the three-phase
// pipeline and the single-call assistant routes.
// All provider calls go through llm_client::ProviderGateway.

pub mod assistant;
pub mod context;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
