use std::sync::Arc;

use {
    anyhow::Result,
    async_trait::async_trait,
    recap_channels::{ChannelKey, ChannelOutbound},
    serenity::{all::ChannelId, http::Http},
};

/// Posts text to Discord channels over the REST API.
pub struct DiscordOutbound {
    http: Arc<Http>,
}

impl DiscordOutbound {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// Parse a stored key back into a Discord channel id.
pub fn channel_id(key: &ChannelKey) -> Result<ChannelId> {
    let id: u64 = key
        .as_str()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid discord channel id {key:?}: {e}"))?;
    if id == 0 {
        anyhow::bail!("invalid discord channel id {key:?}: zero");
    }
    Ok(ChannelId::new(id))
}

#[async_trait]
impl ChannelOutbound for DiscordOutbound {
    async fn send_text(&self, to: &ChannelKey, text: &str) -> Result<()> {
        channel_id(to)?.say(&self.http, text).await?;
        Ok(())
    }
}
