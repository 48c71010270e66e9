//! Exploration pipeline: the three-phase orchestration behind `/api/explore`.
//!
//! Flow: research (Perplexity) → structured + creative career exploration
//!       (Claude and GPT, concurrently) → synthesis (Claude).
//!
//! No phase failure is fatal. A failed or skipped call leaves its field `None`
//! and appends exactly one entry to `errors`; later phases still run.

use serde::Serialize;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::exploration::context::{
    or_not_available, profile_context, research_context, research_sectors,
};
use crate::exploration::prompts::{PromptName, PromptTemplates};
use crate::llm_client::{ProviderError, ProviderGateway, ProviderKind};
use crate::models::profile::Profile;

pub const RESEARCH_PROVIDER: ProviderKind = ProviderKind::Perplexity;
pub const STRUCTURED_PROVIDER: ProviderKind = ProviderKind::Claude;
pub const CREATIVE_PROVIDER: ProviderKind = ProviderKind::OpenAi;
pub const SYNTHESIS_PROVIDER: ProviderKind = ProviderKind::Claude;

const RESEARCH_MAX_TOKENS: u32 = 4000;
const EXPLORATION_MAX_TOKENS: u32 = 4000;
/// Larger than every earlier phase: the report is the longest output.
const SYNTHESIS_MAX_TOKENS: u32 = 8192;

const SYNTHESIS_LABEL: &str = "Synthèse";
const LIMITED_RESEARCH: &str = "Perplexity non disponible - recherche web limitée";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Accumulator owned by a single pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineResult {
    pub research: Option<String>,
    pub careers_structured: Option<String>,
    pub careers_creative: Option<String>,
    pub synthesis: Option<String>,
    pub errors: Vec<String>,
}

impl PipelineResult {
    /// Stores a successful outcome, or records its error and returns `None`.
    fn settle(&mut self, label: &str, outcome: Result<String, ProviderError>) -> Option<String> {
        match outcome {
            Ok(text) => Some(text),
            Err(e) => {
                let entry = format!("{label}: {e}");
                warn!("{entry}");
                self.errors.push(entry);
                None
            }
        }
    }
}

/// `/api/explore` response body. `success` is always true: degradation is
/// signalled by `None` fields and a non-empty `errors`.
#[derive(Debug, Clone, Serialize)]
pub struct ExplorationReport {
    pub success: bool,
    pub synthesis: Option<String>,
    pub details: ExplorationDetails,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplorationDetails {
    pub research: Option<String>,
    pub careers_structured: Option<String>,
    pub careers_creative: Option<String>,
}

impl From<PipelineResult> for ExplorationReport {
    fn from(result: PipelineResult) -> Self {
        ExplorationReport {
            success: true,
            synthesis: result.synthesis,
            details: ExplorationDetails {
                research: result.research,
                careers_structured: result.careers_structured,
                careers_creative: result.careers_creative,
            },
            errors: result.errors,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs research → exploration → synthesis for one profile.
pub async fn run_exploration(
    gateway: &dyn ProviderGateway,
    templates: &PromptTemplates,
    profile: &Profile,
) -> PipelineResult {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("exploration", %run_id);

    async move {
        let mut result = PipelineResult::default();
        let summary = profile_context(profile);

        // Phase 1: web research
        info!("Phase 1: research");
        if gateway.is_available(RESEARCH_PROVIDER) {
            let prompt = research_prompt(templates, profile);
            let outcome = gateway
                .invoke(RESEARCH_PROVIDER, &prompt, RESEARCH_MAX_TOKENS)
                .await;
            result.research = result.settle(RESEARCH_PROVIDER.label(), outcome);
        } else {
            warn!("{LIMITED_RESEARCH}");
            result.errors.push(LIMITED_RESEARCH.to_string());
        }

        // Phase 2: both calls in flight together; both settle before phase 3.
        info!("Phase 2: career exploration");
        let context = research_context(&summary, result.research.as_deref());
        let structured_prompt =
            templates.render(PromptName::CareersStructured, &[("context", &context)]);
        let creative_prompt =
            templates.render(PromptName::CareersCreative, &[("context", &context)]);

        let (structured, creative) = tokio::join!(
            invoke_if_available(
                gateway,
                STRUCTURED_PROVIDER,
                &structured_prompt,
                EXPLORATION_MAX_TOKENS
            ),
            invoke_if_available(
                gateway,
                CREATIVE_PROVIDER,
                &creative_prompt,
                EXPLORATION_MAX_TOKENS
            ),
        );
        result.careers_structured = result.settle(STRUCTURED_PROVIDER.label(), structured);
        result.careers_creative = result.settle(CREATIVE_PROVIDER.label(), creative);

        // Phase 3: synthesis
        info!("Phase 3: synthesis");
        let prompt = synthesis_prompt(templates, &summary, &result);
        let outcome = invoke_if_available(
            gateway,
            SYNTHESIS_PROVIDER,
            &prompt,
            SYNTHESIS_MAX_TOKENS,
        )
        .await;
        result.synthesis = result.settle(SYNTHESIS_LABEL, outcome);

        info!(
            "Exploration finished with {} error(s); synthesis {}",
            result.errors.len(),
            if result.synthesis.is_some() { "available" } else { "missing" }
        );
        result
    }
    .instrument(span)
    .await
}

/// Skips unconfigured providers without attempting a call.
async fn invoke_if_available(
    gateway: &dyn ProviderGateway,
    kind: ProviderKind,
    prompt: &str,
    max_tokens: u32,
) -> Result<String, ProviderError> {
    if !gateway.is_available(kind) {
        return Err(ProviderError::NotConfigured(kind));
    }
    gateway.invoke(kind, prompt, max_tokens).await
}

fn research_prompt(templates: &PromptTemplates, profile: &Profile) -> String {
    let sectors = research_sectors(profile);
    templates.render(
        PromptName::Research,
        &[
            ("location", profile.location()),
            ("mobility", profile.mobility().label()),
            ("sectors", &sectors),
        ],
    )
}

/// Missing phase outputs become the explicit placeholder, never omitted.
fn synthesis_prompt(templates: &PromptTemplates, summary: &str, result: &PipelineResult) -> String {
    templates.render(
        PromptName::Synthesis,
        &[
            ("profile", summary),
            ("research", or_not_available(result.research.as_deref())),
            (
                "careers_structured",
                or_not_available(result.careers_structured.as_deref()),
            ),
            (
                "careers_creative",
                or_not_available(result.careers_creative.as_deref()),
            ),
        ],
    )
}
