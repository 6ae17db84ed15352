use std::sync::Arc;

use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::{Context, EventHandler};
use tracing::{debug, info};

use relaycord_agent::pipeline::InboundMessage;
use relaycord_agent::Relay;
use relaycord_core::ChannelKey;

use crate::history::ChannelHistory;
use crate::respond::ChannelReply;

/// Serenity event handler wired to the relay pipeline.
pub struct RelayHandler {
    pub relay: Arc<Relay>,
}

#[async_trait]
impl EventHandler for RelayHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Ready! Logged in as {}", ready.user.tag());
        crate::commands::register_commands(&ctx).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Bot authors are dropped by the pipeline itself.
        let inbound = InboundMessage {
            channel: ChannelKey(msg.channel_id.get()),
            content: msg.content.clone(),
            author_is_bot: msg.author.bot,
        };

        let relay = Arc::clone(&self.relay);
        let http = Arc::clone(&ctx.http);
        let reply = ChannelReply::new(Arc::clone(&http), msg.channel_id, msg.id);
        let history = ChannelHistory::new(http);

        tokio::spawn(async move {
            let outcome = relay.on_message(&history, &reply, &inbound).await;
            debug!(channel = %inbound.channel, ?outcome, "message handled");
        });
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            crate::commands::handle_interaction(&self.relay, &ctx, command).await;
        }
    }
}
