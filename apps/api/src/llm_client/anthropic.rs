//! Anthropic Messages API envelope.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{check_envelope, non_empty, send, ProviderError};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-20250514";

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

pub(super) async fn complete(
    client: &Client,
    api_key: &str,
    prompt: &str,
    max_tokens: u32,
) -> Result<String, ProviderError> {
    let body = AnthropicRequest {
        model: MODEL,
        max_tokens,
        messages: vec![AnthropicMessage {
            role: "user",
            content: prompt,
        }],
    };

    let request = client
        .post(ANTHROPIC_API_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .header("content-type", "application/json")
        .json(&body);

    let (status, body) = send(request).await?;
    parse_response(status, &body)
}

/// Extracts the first text block.
fn parse_response(status: u16, body: &str) -> Result<String, ProviderError> {
    check_envelope(status, body)?;
    let response: AnthropicResponse = serde_json::from_str(body)?;
    let text = response
        .content
        .into_iter()
        .find(|b| b.block_type == "text")
        .and_then(|b| b.text);
    non_empty(text)
}
