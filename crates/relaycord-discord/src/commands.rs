//! Discord slash commands: `/ping`, `/analyze`, `/reset`.
//!
//! Registration happens in `ready()`. Interactions are dispatched from
//! `interaction_create` in the event handler.

use std::sync::Arc;

use serenity::builder::CreateCommand;
use serenity::model::application::{Command as AppCommand, CommandInteraction};
use serenity::model::channel::ChannelType;
use serenity::prelude::Context;
use tracing::{debug, info, warn};

use relaycord_agent::pipeline::Command;
use relaycord_agent::Relay;
use relaycord_core::ChannelKey;

use crate::history::ChannelHistory;
use crate::respond::CommandReply;

/// Serenity builders for every command the bot answers.
pub fn command_builders() -> Vec<CreateCommand> {
    Command::ALL
        .into_iter()
        .map(|c| CreateCommand::new(c.name()).description(c.description()))
        .collect()
}

/// Register the global slash commands. Failures are logged only.
pub async fn register_commands(ctx: &Context) {
    info!("Started refreshing application (/) commands.");
    match AppCommand::set_global_commands(&ctx.http, command_builders()).await {
        Ok(cmds) => info!(
            count = cmds.len(),
            "Successfully reloaded application (/) commands."
        ),
        Err(e) => warn!(error = %e, "failed to register global slash commands"),
    }
}

/// Whether history can be read where the interaction was invoked.
pub fn is_text_channel(kind: Option<ChannelType>) -> bool {
    matches!(
        kind,
        Some(
            ChannelType::Text
                | ChannelType::Private
                | ChannelType::News
                | ChannelType::NewsThread
                | ChannelType::PublicThread
                | ChannelType::PrivateThread
                | ChannelType::Voice
                | ChannelType::Stage
        )
    )
}

/// Dispatch a slash command interaction through the relay.
pub async fn handle_interaction(relay: &Arc<Relay>, ctx: &Context, command: CommandInteraction) {
    let name = command.data.name.clone();
    let channel = ChannelKey(command.channel_id.get());
    let in_text_channel = is_text_channel(command.channel.as_ref().map(|c| c.kind));

    let history = ChannelHistory::new(Arc::clone(&ctx.http));
    let responder = CommandReply::new(Arc::clone(&ctx.http), command);

    let outcome = relay
        .on_command(&history, &responder, &name, channel, in_text_channel)
        .await;
    debug!(command = %name, channel = %channel, ?outcome, "slash command handled");
}
