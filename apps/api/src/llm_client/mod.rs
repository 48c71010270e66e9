/// LLM Client: the single point of entry for every text-generation provider.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// Pipeline and assistant code talk to `ProviderGateway`; `LlmClient` is the
/// production gateway and owns the per-provider wire envelopes.
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::{Availability, Credentials};

pub mod anthropic;
pub mod chat_completions;
pub mod gemini;

/// The fixed set of providers this service knows how to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Claude,
    OpenAi,
    Perplexity,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Claude,
        ProviderKind::OpenAi,
        ProviderKind::Perplexity,
        ProviderKind::Gemini,
    ];

    /// Short label used as the prefix of recorded pipeline errors.
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::Claude => "Claude",
            ProviderKind::OpenAi => "GPT",
            ProviderKind::Perplexity => "Perplexity",
            ProviderKind::Gemini => "Gemini",
        }
    }

    pub fn model(self) -> &'static str {
        match self {
            ProviderKind::Claude => anthropic::MODEL,
            ProviderKind::OpenAi => chat_completions::OPENAI_MODEL,
            ProviderKind::Perplexity => chat_completions::PERPLEXITY_MODEL,
            ProviderKind::Gemini => gemini::MODEL,
        }
    }

    /// Clamps a requested output bound to what the provider accepts.
    pub fn clamp_tokens(self, requested: u32) -> u32 {
        match self {
            ProviderKind::OpenAi => requested.min(chat_completions::OPENAI_MAX_TOKENS),
            _ => requested,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Availability {
    pub fn contains(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::Claude => self.claude,
            ProviderKind::OpenAi => self.openai,
            ProviderKind::Perplexity => self.perplexity,
            ProviderKind::Gemini => self.gemini,
        }
    }
}

/// Uniform failure of one provider call. Never escapes the call site as a
/// fault: callers turn it into a recorded error string.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured for {0}")]
    NotConfigured(ProviderKind),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Message reported by the provider itself, kept verbatim.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("provider returned empty content")]
    EmptyContent,
}

/// The capability set every provider is reached through.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    fn availability(&self) -> Availability;

    fn is_available(&self, kind: ProviderKind) -> bool {
        self.availability().contains(kind)
    }

    async fn invoke(
        &self,
        kind: ProviderKind,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError>;
}

/// Returns the first provider of `priority` that is currently available.
pub fn select_provider(
    priority: &[ProviderKind],
    availability: Availability,
) -> Option<ProviderKind> {
    priority
        .iter()
        .copied()
        .find(|kind| availability.contains(*kind))
}

/// Production gateway backed by `reqwest`.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    credentials: Credentials,
}

impl LlmClient {
    /// Builds the shared HTTP client. Every call is bounded by `timeout`
    /// and is never retried.
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            credentials,
        })
    }

    fn credential(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::Claude => self.credentials.anthropic.as_deref(),
            ProviderKind::OpenAi => self.credentials.openai.as_deref(),
            ProviderKind::Perplexity => self.credentials.perplexity.as_deref(),
            ProviderKind::Gemini => self.credentials.gemini.as_deref(),
        }
    }
}

#[async_trait]
impl ProviderGateway for LlmClient {
    fn availability(&self) -> Availability {
        self.credentials.availability()
    }

    async fn invoke(
        &self,
        kind: ProviderKind,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .credential(kind)
            .ok_or(ProviderError::NotConfigured(kind))?;
        let max_tokens = kind.clamp_tokens(max_tokens);

        debug!(
            "Calling {} (model={}, max_tokens={}, prompt_chars={})",
            kind,
            kind.model(),
            max_tokens,
            prompt.chars().count()
        );

        let text = match kind {
            ProviderKind::Claude => {
                anthropic::complete(&self.client, api_key, prompt, max_tokens).await?
            }
            ProviderKind::OpenAi => {
                chat_completions::complete(
                    &self.client,
                    chat_completions::OPENAI_API_URL,
                    chat_completions::OPENAI_MODEL,
                    api_key,
                    prompt,
                    max_tokens,
                )
                .await?
            }
            ProviderKind::Perplexity => {
                chat_completions::complete(
                    &self.client,
                    chat_completions::PERPLEXITY_API_URL,
                    chat_completions::PERPLEXITY_MODEL,
                    api_key,
                    prompt,
                    max_tokens,
                )
                .await?
            }
            ProviderKind::Gemini => {
                gemini::complete(&self.client, api_key, prompt, max_tokens).await?
            }
        };

        debug!("{} call succeeded ({} chars)", kind, text.chars().count());
        Ok(text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Envelope helpers shared by the provider modules
// ────────────────────────────────────────────────────────────────────────────

/// `{"error": {"message": ...}}` is the error shape all four providers share.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Sends a request and returns the raw status code and body.
async fn send(request: RequestBuilder) -> Result<(u16, String), ProviderError> {
    let response = request.send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok((status, body))
}

/// Rejects bodies carrying a provider error object (even with a 2xx status)
/// and non-2xx responses.
fn check_envelope(status: u16, body: &str) -> Result<(), ProviderError> {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return Err(ProviderError::Api {
            status,
            message: envelope.error.message,
        });
    }

    if !(200..300).contains(&status) {
        let message = if body.trim().is_empty() {
            format!("HTTP status {status}")
        } else {
            body.trim().to_string()
        };
        return Err(ProviderError::Api { status, message });
    }

    Ok(())
}

fn non_empty(text: Option<String>) -> Result<String, ProviderError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ProviderError::EmptyContent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn availability(claude: bool, openai: bool, perplexity: bool, gemini: bool) -> Availability {
        Availability {
            claude,
            openai,
            perplexity,
            gemini,
        }
    }

    #[test]
    fn test_select_provider_takes_first_available() {
        let priority = [ProviderKind::Claude, ProviderKind::OpenAi];
        assert_eq!(
            select_provider(&priority, availability(true, true, false, false)),
            Some(ProviderKind::Claude)
        );
    }

    #[test]
    fn test_select_provider_falls_through_to_second() {
        let priority = [ProviderKind::Perplexity, ProviderKind::Claude];
        assert_eq!(
            select_provider(&priority, availability(true, false, false, false)),
            Some(ProviderKind::Claude)
        );
    }

    #[test]
    fn test_select_provider_none_available() {
        let priority = [ProviderKind::Claude, ProviderKind::OpenAi];
        assert_eq!(
            select_provider(&priority, availability(false, false, true, true)),
            None
        );
    }

    #[test]
    fn test_openai_tokens_are_capped() {
        assert_eq!(ProviderKind::OpenAi.clamp_tokens(8192), 4000);
        assert_eq!(ProviderKind::OpenAi.clamp_tokens(1000), 1000);
        assert_eq!(ProviderKind::Claude.clamp_tokens(8192), 8192);
    }

    #[test]
    fn test_error_object_in_success_body_is_an_api_error() {
        let body = r#"{"error": {"message": "Invalid API key", "type": "auth"}}"#;
        match check_envelope(200, body) {
            Err(ProviderError::Api { status, message }) => {
                assert_eq!(status, 200);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_2xx_without_error_object_keeps_body() {
        match check_envelope(502, "Bad Gateway") {
            Err(ProviderError::Api { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_2xx_with_empty_body_reports_status() {
        let err = check_envelope(503, "").unwrap_err();
        assert_eq!(err.to_string(), "HTTP status 503");
    }

    #[test]
    fn test_blank_text_is_empty_content() {
        assert!(matches!(
            non_empty(Some("  \n".to_string())),
            Err(ProviderError::EmptyContent)
        ));
        assert!(matches!(non_empty(None), Err(ProviderError::EmptyContent)));
    }

    #[test]
    fn test_not_configured_message() {
        let err = ProviderError::NotConfigured(ProviderKind::Perplexity);
        assert_eq!(err.to_string(), "no API key configured for Perplexity");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        // Nothing listens on port 1.
        let err = send(Client::new().get("http://127.0.0.1:1")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)));
        assert!(err.to_string().starts_with("HTTP error: "));
        assert!(err.to_string().len() > "HTTP error: ".len());
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_never_called() {
        let client = LlmClient::new(Credentials::default(), Duration::from_secs(1)).unwrap();
        let err = client
            .invoke(ProviderKind::Claude, "hello", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(ProviderKind::Claude)));
    }
}
