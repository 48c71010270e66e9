//! Follow-up chat and targeted search: one call each, to the first available
//! provider of a fixed priority list.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::exploration::prompts::{PromptName, PromptTemplates};
use crate::llm_client::{select_provider, ProviderGateway, ProviderKind};
use crate::models::profile::{lenient_profile, Profile, SearchScope, DEFAULT_LOCATION};

pub const CHAT_PRIORITY: [ProviderKind; 2] = [ProviderKind::Claude, ProviderKind::OpenAi];
pub const SEARCH_PRIORITY: [ProviderKind; 2] = [ProviderKind::Perplexity, ProviderKind::Claude];

const CHAT_MAX_TOKENS: u32 = 4000;
const REPORT_EXCERPT_CHARS: usize = 1500;
pub const NO_PROVIDER: &str = "Aucune IA disponible";

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub context: Option<ChatContext>,
}

/// What the client remembers from its previous exploration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatContext {
    #[serde(default, deserialize_with = "lenient_profile")]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub synthesis: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default, deserialize_with = "lenient_profile")]
    pub profile: Option<Profile>,
}

/// `{response, error}`: exactly one of the two is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub response: Option<String>,
    pub error: Option<String>,
}

/// POST /api/chat body → reply.
pub async fn answer_question(
    gateway: &dyn ProviderGateway,
    templates: &PromptTemplates,
    request: &ChatRequest,
) -> AssistantReply {
    let context = request.context.clone().unwrap_or_default();
    let location = location_of(context.profile.as_ref());
    let excerpt = report_excerpt(context.synthesis.as_deref());

    let prompt = templates.render(
        PromptName::Chat,
        &[
            ("location", location.as_str()),
            ("report_excerpt", excerpt.as_str()),
            ("question", request.question.as_str()),
        ],
    );

    single_call(gateway, &CHAT_PRIORITY, &prompt, |_| CHAT_MAX_TOKENS).await
}

/// POST /api/search body → reply.
pub async fn search(
    gateway: &dyn ProviderGateway,
    templates: &PromptTemplates,
    request: &SearchRequest,
) -> AssistantReply {
    let scope = SearchScope::from_tag(request.scope.as_deref());
    let location = location_of(request.profile.as_ref());

    let prompt = templates.render(
        PromptName::Search,
        &[
            ("query", request.query.as_str()),
            ("scope", scope.label()),
            ("location", location.as_str()),
        ],
    );

    single_call(gateway, &SEARCH_PRIORITY, &prompt, search_max_tokens).await
}

/// Search answers from the Claude fallback get the longer report bound.
fn search_max_tokens(kind: ProviderKind) -> u32 {
    match kind {
        ProviderKind::Claude => 8192,
        _ => 4000,
    }
}

async fn single_call(
    gateway: &dyn ProviderGateway,
    priority: &[ProviderKind],
    prompt: &str,
    max_tokens: impl Fn(ProviderKind) -> u32,
) -> AssistantReply {
    let Some(kind) = select_provider(priority, gateway.availability()) else {
        warn!("No provider available among {:?}", priority);
        return AssistantReply {
            response: None,
            error: Some(NO_PROVIDER.to_string()),
        };
    };

    info!("Routing single call to {}", kind);
    match gateway.invoke(kind, prompt, max_tokens(kind)).await {
        Ok(text) => AssistantReply {
            response: Some(text),
            error: None,
        },
        Err(e) => {
            warn!("{} call failed: {}", kind, e);
            AssistantReply {
                response: None,
                error: Some(e.to_string()),
            }
        }
    }
}

fn location_of(profile: Option<&Profile>) -> String {
    profile
        .map(|p| p.location().to_string())
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string())
}

/// First characters of the previous report, or nothing without a report.
fn report_excerpt(synthesis: Option<&str>) -> String {
    match synthesis.map(str::trim).filter(|s| !s.is_empty()) {
        Some(report) => {
            let excerpt: String = report.chars().take(REPORT_EXCERPT_CHARS).collect();
            format!("Extrait du rapport précédent : {excerpt}...")
        }
        None => String::new(),
    }
}
