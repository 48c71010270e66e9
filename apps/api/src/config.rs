use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;

/// Application configuration loaded from environment variables.
/// Missing provider credentials never fail startup: the provider is simply
/// reported as unavailable.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub port: u16,
    pub rust_log: String,
    pub public_dir: PathBuf,
    pub prompts_dir: Option<PathBuf>,
    pub provider_timeout: Duration,
}

/// One credential per provider. `None` means "not configured".
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub anthropic: Option<String>,
    pub openai: Option<String>,
    pub perplexity: Option<String>,
    pub gemini: Option<String>,
}

/// Credential-presence flags, serialized as the `/api/status` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Availability {
    pub claude: bool,
    pub openai: bool,
    pub perplexity: bool,
    pub gemini: bool,
}

impl Credentials {
    pub fn availability(&self) -> Availability {
        Availability {
            claude: self.anthropic.is_some(),
            openai: self.openai.is_some(),
            perplexity: self.perplexity.is_some(),
            gemini: self.gemini.is_some(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match optional("PROVIDER_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("PROVIDER_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_PROVIDER_TIMEOUT_SECS,
        };

        Ok(Config {
            credentials: Credentials {
                anthropic: optional("ANTHROPIC_API_KEY"),
                openai: optional("OPENAI_API_KEY"),
                perplexity: optional("PERPLEXITY_API_KEY"),
                gemini: optional("GEMINI_API_KEY"),
            },
            port,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            public_dir: optional("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            prompts_dir: optional("PROMPTS_DIR").map(PathBuf::from),
            provider_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert!(config.prompts_dir.is_none());
        assert_eq!(config.provider_timeout, Duration::from_secs(120));
        assert_eq!(config.credentials.availability(), Availability::default());
    }

    #[test]
    fn test_only_perplexity_configured() {
        let config =
            Config::from_lookup(lookup_from(&[("PERPLEXITY_API_KEY", "pplx-123")])).unwrap();
        assert_eq!(
            config.credentials.availability(),
            Availability {
                claude: false,
                openai: false,
                perplexity: true,
                gemini: false,
            }
        );
    }

    #[test]
    fn test_blank_credential_counts_as_absent() {
        let config = Config::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "   "),
            ("OPENAI_API_KEY", ""),
        ]))
        .unwrap();
        assert!(config.credentials.anthropic.is_none());
        assert!(config.credentials.openai.is_none());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_custom_timeout_and_dirs() {
        let config = Config::from_lookup(lookup_from(&[
            ("PROVIDER_TIMEOUT_SECS", "30"),
            ("PUBLIC_DIR", "/srv/www"),
            ("PROMPTS_DIR", "/etc/orientation/prompts"),
        ]))
        .unwrap();
        assert_eq!(config.provider_timeout, Duration::from_secs(30));
        assert_eq!(config.public_dir, PathBuf::from("/srv/www"));
        assert_eq!(
            config.prompts_dir,
            Some(PathBuf::from("/etc/orientation/prompts"))
        );
    }
}
