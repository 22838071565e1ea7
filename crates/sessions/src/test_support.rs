//! Recording fakes for the generation and chat-gateway collaborators.

use std::time::Duration;

use {
    async_trait::async_trait,
    recap_channels::{ChannelKey, ChannelOutbound},
    recap_providers::{ChatMessage, LlmProvider},
    tokio::sync::Mutex,
};

pub(crate) struct MockProvider {
    reply: Result<String, String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockProvider {
    pub(crate) fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep for `delay` inside every `complete` call.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) async fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn id(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        self.calls.lock().await.push(messages.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

#[derive(Default)]
pub(crate) struct RecordingOutbound {
    sent: Mutex<Vec<(ChannelKey, String)>>,
    fail: bool,
}

impl RecordingOutbound {
    pub(crate) fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub(crate) async fn sent(&self) -> Vec<(ChannelKey, String)> {
        self.sent.lock().await.clone()
    }

    pub(crate) async fn texts(&self) -> Vec<String> {
        self.sent().await.into_iter().map(|(_, t)| t).collect()
    }
}

#[async_trait]
impl ChannelOutbound for RecordingOutbound {
    async fn send_text(&self, to: &ChannelKey, text: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("gateway unavailable");
        }
        self.sent.lock().await.push((to.clone(), text.to_string()));
        Ok(())
    }
}
