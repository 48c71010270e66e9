//! Chat-completions envelope, shared by OpenAI and Perplexity.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{check_envelope, non_empty, send, ProviderError};

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_MODEL: &str = "gpt-4o";
pub const OPENAI_MAX_TOKENS: u32 = 4000;

pub const PERPLEXITY_API_URL: &str = "https://api.perplexity.ai/chat/completions";
pub const PERPLEXITY_MODEL: &str = "sonar";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub(super) async fn complete(
    client: &Client,
    url: &str,
    model: &str,
    api_key: &str,
    prompt: &str,
    max_tokens: u32,
) -> Result<String, ProviderError> {
    let body = ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
        max_tokens,
    };

    let request = client.post(url).bearer_auth(api_key).json(&body);

    let (status, body) = send(request).await?;
    parse_response(status, &body)
}

/// Extracts `choices[0].message.content`.
fn parse_response(status: u16, body: &str) -> Result<String, ProviderError> {
    check_envelope(status, body)?;
    let response: ChatResponse = serde_json::from_str(body)?;
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content);
    non_empty(text)
}
