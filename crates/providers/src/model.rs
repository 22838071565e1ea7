use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message in a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Text-generation provider (OpenAI-compatible gateways, local servers, ...).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Model identifier (e.g. "gpt-4o-mini", "gemini-3-flash-preview").
    fn id(&self) -> &str;

    /// Run a single non-streaming completion and return the generated text.
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String>;
}
