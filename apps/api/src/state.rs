use std::sync::Arc;

use crate::config::Config;
use crate::exploration::prompts::PromptTemplates;
use crate::llm_client::ProviderGateway;

/// Shared application state injected into all route handlers via Axum extractors.
/// Nothing in here is mutable: every request owns its own pipeline result.
#[derive(Clone)]
pub struct AppState {
    /// Provider gateway. Production: `LlmClient`; tests swap in scripted gateways.
    pub llm: Arc<dyn ProviderGateway>,
    pub prompts: Arc<PromptTemplates>,
    pub config: Config,
}
