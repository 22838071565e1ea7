use std::fmt;

use {
    anyhow::Result,
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

/// Platform-neutral channel identifier (a Discord snowflake, rendered as text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelKey(pub String);

impl ChannelKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ChannelKey {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// A chat message delivered by the gateway.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub channel: ChannelKey,
    /// True when the message was posted by this bot's own account.
    pub author_is_self: bool,
    pub text: String,
}

/// Send messages to a channel.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    async fn send_text(&self, to: &ChannelKey, text: &str) -> Result<()>;
}
