use std::sync::Arc;

use {
    async_trait::async_trait,
    recap_channels::{ChannelKey, InboundMessage},
    recap_sessions::SessionManager,
    serenity::all::{
        Command, CommandInteraction, Context, CreateInteractionResponse,
        CreateInteractionResponseMessage, EventHandler, Interaction, Message, Ready,
    },
    tracing::{debug, info, warn},
};

use crate::commands::{self, Reply};

/// Gateway event handler bridging Discord to the session manager.
pub struct Handler {
    manager: Arc<SessionManager>,
}

impl Handler {
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }

    async fn handle_command(&self, ctx: &Context, command: &CommandInteraction) {
        let channel = ChannelKey::from(command.channel_id.get());
        let options = commands::collect_options(&command.data.options);
        let invocation = match commands::parse(&command.data.name, &options) {
            Ok(invocation) => invocation,
            Err(e) => {
                warn!(command = %command.data.name, error = %e, "rejected command");
                respond(ctx, command, commands::invalid_invocation(&e)).await;
                return;
            },
        };

        let (reply, finalizer) = commands::execute(&self.manager, &channel, invocation).await;
        respond(ctx, command, reply).await;

        // Finalization runs after the acknowledgement has been sent.
        if let Some(finalizer) = finalizer {
            tokio::spawn(async move {
                finalizer.run().await;
            });
        }
    }
}

async fn respond(ctx: &Context, command: &CommandInteraction, reply: Reply) {
    let message = CreateInteractionResponseMessage::new()
        .content(reply.content)
        .ephemeral(reply.ephemeral);
    if let Err(e) = command
        .create_response(&ctx.http, CreateInteractionResponse::Message(message))
        .await
    {
        warn!(command = %command.data.name, error = %e, "failed to respond to command");
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "discord gateway ready");
        match Command::set_global_commands(&ctx.http, commands::definitions()).await {
            Ok(registered) => info!(count = registered.len(), "slash commands synced"),
            Err(e) => warn!(error = %e, "failed to sync slash commands"),
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let author_is_self = msg.author.id == ctx.cache.current_user().id;
        let inbound = InboundMessage {
            channel: ChannelKey::from(msg.channel_id.get()),
            author_is_self,
            text: msg.content,
        };
        if self.manager.ingest(inbound).await {
            debug!(channel = %msg.channel_id, "message buffered");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            debug!(command = %command.data.name, channel = %command.channel_id, "command received");
            self.handle_command(&ctx, &command).await;
        }
    }
}
