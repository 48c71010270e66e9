//! Gemini `generateContent` envelope. Optional provider: reported by
//! `/api/status` and callable, but not part of any fixed pipeline role.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{check_envelope, non_empty, send, ProviderError};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const MODEL: &str = "gemini-1.5-pro";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

pub(super) async fn complete(
    client: &Client,
    api_key: &str,
    prompt: &str,
    max_tokens: u32,
) -> Result<String, ProviderError> {
    let body = GeminiRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            max_output_tokens: max_tokens,
        },
    };

    let url = format!("{GEMINI_API_BASE}/{MODEL}:generateContent");
    let request = client.post(url).query(&[("key", api_key)]).json(&body);

    let (status, body) = send(request).await?;
    parse_response(status, &body)
}

/// Extracts `candidates[0].content.parts[0].text`.
fn parse_response(status: u16, body: &str) -> Result<String, ProviderError> {
    check_envelope(status, body)?;
    let response: GeminiResponse = serde_json::from_str(body)?;
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text);
    non_empty(text)
}
