//! Prompt templates for the exploration pipeline and the assistant routes.
//!
//! Templates are data, not code: the defaults live under `apps/api/prompts/`
//! and are compiled in; a `PROMPTS_DIR` can override any of them by file name.
//! Placeholders are `{name}` tokens filled in by `render`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptName {
    Research,
    CareersStructured,
    CareersCreative,
    Synthesis,
    Chat,
    Search,
}

impl PromptName {
    pub const ALL: [PromptName; 6] = [
        PromptName::Research,
        PromptName::CareersStructured,
        PromptName::CareersCreative,
        PromptName::Synthesis,
        PromptName::Chat,
        PromptName::Search,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            PromptName::Research => "research.md",
            PromptName::CareersStructured => "careers_structured.md",
            PromptName::CareersCreative => "careers_creative.md",
            PromptName::Synthesis => "synthesis.md",
            PromptName::Chat => "chat.md",
            PromptName::Search => "search.md",
        }
    }

    fn builtin(self) -> &'static str {
        match self {
            PromptName::Research => include_str!("../../prompts/research.md"),
            PromptName::CareersStructured => include_str!("../../prompts/careers_structured.md"),
            PromptName::CareersCreative => include_str!("../../prompts/careers_creative.md"),
            PromptName::Synthesis => include_str!("../../prompts/synthesis.md"),
            PromptName::Chat => include_str!("../../prompts/chat.md"),
            PromptName::Search => include_str!("../../prompts/search.md"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    templates: HashMap<PromptName, String>,
}

impl PromptTemplates {
    pub fn builtin() -> Self {
        Self {
            templates: PromptName::ALL
                .iter()
                .map(|name| (*name, name.builtin().to_string()))
                .collect(),
        }
    }

    /// Built-in templates, with every `<name>.md` found in `dir` taking precedence.
    pub fn with_overrides(dir: &Path) -> Result<Self> {
        let mut templates = Self::builtin();

        for name in PromptName::ALL {
            let path = dir.join(name.file_name());
            if !path.is_file() {
                continue;
            }
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read prompt template {}", path.display()))?;
            info!("Prompt template {:?} overridden from {}", name, path.display());
            templates.templates.insert(name, text);
        }

        Ok(templates)
    }

    pub fn template(&self, name: PromptName) -> &str {
        self.templates
            .get(&name)
            .map(String::as_str)
            .unwrap_or_else(|| name.builtin())
    }

    pub fn render(&self, name: PromptName, vars: &[(&str, &str)]) -> String {
        render(self.template(name), vars)
    }
}

/// Single-pass `{name}` substitution. Substituted values are never rescanned,
/// so text coming back from a provider cannot inject placeholders.
/// Unknown or malformed tokens are left untouched.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let token = after.find('}').map(|end| &after[..end]).filter(|name| {
            !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

        match token.and_then(|name| vars.iter().find(|(key, _)| *key == name)) {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
