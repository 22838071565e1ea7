/// OpenAI-compatible chat-completions provider using the `/chat/completions` endpoint.
use std::time::Duration;

use {
    anyhow::Context,
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use {
    crate::model::{ChatMessage, LlmProvider},
    recap_config::ProviderConfig,
};

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Option<Secret<String>>,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(api_key: Option<Secret<String>>, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            model,
        }
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> anyhow::Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(self)
    }

    /// Build a provider from the `[provider]` config section, resolving the
    /// API key from the environment when it is not set in the file.
    pub fn from_config(config: &ProviderConfig) -> anyhow::Result<Self> {
        let api_key = config.resolve_api_key().map(Secret::new);
        Self::new(api_key, config.model.clone())
            .with_base_url(config.base_url.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs.max(1)))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        let req = CompletionRequest {
            model: &self.model,
            messages,
        };

        debug!(model = %self.model, messages = messages.len(), "requesting completion");

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&req);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let resp = builder
            .send()
            .await?
            .error_for_status()?
            .json::<CompletionResponse>()
            .await?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("completion response contained no message content"))
    }
}
