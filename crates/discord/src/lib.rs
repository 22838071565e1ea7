//! Discord gateway for the session engine.
//!
//! Registers the `config`, `start` and `stop` slash commands, forwards every
//! channel message to [`SessionManager::ingest`], and posts summaries through
//! [`outbound::DiscordOutbound`].

pub mod commands;
pub mod handler;
pub mod outbound;

use std::sync::Arc;

use {
    anyhow::Context,
    recap_sessions::SessionManager,
    secrecy::{ExposeSecret, Secret},
    serenity::{Client, all::GatewayIntents},
    tracing::info,
};

pub use {handler::Handler, outbound::DiscordOutbound};

/// Intents needed to read message text in guild channels.
pub fn intents() -> GatewayIntents {
    GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT
}

/// Connect to the gateway and dispatch events until the connection ends.
pub async fn run_gateway(token: &Secret<String>, manager: Arc<SessionManager>) -> anyhow::Result<()> {
    let mut client = Client::builder(token.expose_secret(), intents())
        .event_handler(Handler::new(manager))
        .await
        .context("failed to build discord client")?;

    info!("connecting to discord gateway");
    client.start().await.context("discord gateway stopped")?;
    Ok(())
}
