//! Discord implementations of the pipeline's reply surfaces.
//!
//! Plain messages get a typing indicator and a reply that references the
//! triggering message. Slash commands are answered directly, or deferred and
//! then edited. Text longer than one Discord message is split; the overflow
//! follows as plain channel messages.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::{
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage,
    EditInteractionResponse,
};
use serenity::http::Http;
use serenity::model::application::CommandInteraction;
use serenity::model::id::{ChannelId, MessageId};

use relaycord_agent::pipeline::{InteractionResponder, MessageResponder, PipelineError};

use crate::send;

fn platform(e: serenity::Error) -> PipelineError {
    PipelineError::Platform(e.to_string())
}

/// Replies to a plain channel message.
pub struct ChannelReply {
    http: Arc<Http>,
    channel_id: ChannelId,
    reply_to: MessageId,
}

impl ChannelReply {
    pub fn new(http: Arc<Http>, channel_id: ChannelId, reply_to: MessageId) -> Self {
        Self {
            http,
            channel_id,
            reply_to,
        }
    }
}

#[async_trait]
impl MessageResponder for ChannelReply {
    async fn typing(&self) -> Result<(), PipelineError> {
        self.channel_id
            .broadcast_typing(&self.http)
            .await
            .map_err(platform)
    }

    async fn reply(&self, text: &str) -> Result<(), PipelineError> {
        let chunks = send::split_chunks(text);
        let Some((first, rest)) = chunks.split_first() else {
            return Ok(());
        };

        let msg = CreateMessage::new()
            .content(first)
            .reference_message((self.channel_id, self.reply_to));
        self.channel_id
            .send_message(&self.http, msg)
            .await
            .map_err(platform)?;

        send::say_all(&self.http, self.channel_id, rest)
            .await
            .map_err(platform)
    }
}

/// Replies to a slash-command interaction.
pub struct CommandReply {
    http: Arc<Http>,
    command: CommandInteraction,
}

impl CommandReply {
    pub fn new(http: Arc<Http>, command: CommandInteraction) -> Self {
        Self { http, command }
    }
}

#[async_trait]
impl InteractionResponder for CommandReply {
    async fn reply(&self, text: &str) -> Result<(), PipelineError> {
        let chunks = send::split_chunks(text);
        let Some((first, rest)) = chunks.split_first() else {
            return Ok(());
        };

        self.command
            .create_response(
                &self.http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new().content(first),
                ),
            )
            .await
            .map_err(platform)?;

        send::say_all(&self.http, self.command.channel_id, rest)
            .await
            .map_err(platform)
    }

    async fn defer(&self) -> Result<(), PipelineError> {
        self.command
            .create_response(
                &self.http,
                CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new()),
            )
            .await
            .map_err(platform)
    }

    async fn edit(&self, text: &str) -> Result<(), PipelineError> {
        let chunks = send::split_chunks(text);
        let Some((first, rest)) = chunks.split_first() else {
            return Ok(());
        };

        self.command
            .edit_response(&self.http, EditInteractionResponse::new().content(first))
            .await
            .map_err(platform)?;

        send::say_all(&self.http, self.command.channel_id, rest)
            .await
            .map_err(platform)
    }
}
