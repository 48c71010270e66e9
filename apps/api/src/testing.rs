//! Test doubles shared across module tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Availability;
use crate::llm_client::{ProviderError, ProviderGateway, ProviderKind};

type Handler = Box<dyn Fn(ProviderKind, &str) -> Result<String, ProviderError> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub kind: ProviderKind,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Gateway whose replies come from a closure. Records every call and the
/// start/end order of calls (`"start:Claude"`, `"end:GPT"`, ...).
pub struct ScriptedGateway {
    availability: Availability,
    handler: Handler,
    delays: HashMap<ProviderKind, Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    events: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    /// Every available provider answers `"<label> reply"`.
    pub fn new(availability: Availability) -> Self {
        Self {
            availability,
            handler: Box::new(|kind, _: &str| Ok(format!("{} reply", kind.label()))),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(ProviderKind, &str) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        self.handler = Box::new(handler);
        self
    }

    pub fn with_delay(mut self, kind: ProviderKind, delay: Duration) -> Self {
        self.delays.insert(kind, delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderGateway for ScriptedGateway {
    fn availability(&self) -> Availability {
        self.availability
    }

    async fn invoke(
        &self,
        kind: ProviderKind,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            prompt: prompt.to_string(),
            max_tokens,
        });
        self.events
            .lock()
            .unwrap()
            .push(format!("start:{}", kind.label()));

        if let Some(delay) = self.delays.get(&kind) {
            tokio::time::sleep(*delay).await;
        }

        let outcome = (self.handler)(kind, prompt);
        self.events.lock().unwrap().push(format!("end:{}", kind.label()));
        outcome
    }
}

pub fn available(kinds: &[ProviderKind]) -> Availability {
    Availability {
        claude: kinds.contains(&ProviderKind::Claude),
        openai: kinds.contains(&ProviderKind::OpenAi),
        perplexity: kinds.contains(&ProviderKind::Perplexity),
        gemini: kinds.contains(&ProviderKind::Gemini),
    }
}

pub fn api_error(message: &str) -> ProviderError {
    ProviderError::Api {
        status: 500,
        message: message.to_string(),
    }
}
