/// Config schema types (discord gateway, text-generation provider, session defaults).
use serde::{Deserialize, Serialize};

/// Environment variable consulted when `[discord] token` is unset.
pub const DISCORD_TOKEN_ENV: &str = "DISCORD_TOKEN";

/// Environment variables consulted, in order, when `[provider] api_key` is unset.
pub const API_KEY_ENVS: &[&str] = &["RECAP_API_KEY", "OPENAI_API_KEY"];

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecapConfig {
    pub discord: DiscordConfig,
    pub provider: ProviderConfig,
    pub sessions: SessionDefaults,
}

/// Discord gateway settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token. The `DISCORD_TOKEN` env var is used when unset.
    pub token: Option<String>,
}

impl DiscordConfig {
    /// Configured token, falling back to the environment.
    pub fn resolve_token(&self) -> Option<String> {
        non_empty(self.token.clone()).or_else(|| non_empty(std::env::var(DISCORD_TOKEN_ENV).ok()))
    }
}

/// OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key (optional; `RECAP_API_KEY` then `OPENAI_API_KEY` are tried when unset).
    pub api_key: Option<String>,

    /// Base URL up to, not including, `/chat/completions`.
    pub base_url: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            timeout_secs: 120,
        }
    }
}

impl ProviderConfig {
    /// Configured API key, falling back to the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone()).or_else(|| {
            API_KEY_ENVS
                .iter()
                .find_map(|name| non_empty(std::env::var(name).ok()))
        })
    }
}

/// Defaults applied to channels that were never configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDefaults {
    /// Minutes between interval summaries.
    pub default_frequency_minutes: u32,

    /// Summary system prompt. The built-in prompt is used when unset.
    pub default_prompt: Option<String>,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            default_frequency_minutes: 2,
            default_prompt: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
