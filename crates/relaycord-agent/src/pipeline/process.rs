//! Event handling: one linear pass per inbound message or command.
//!
//! Error taxonomy is flat. An empty history produces a fixed notice, a failed
//! completion is already folded into the fallback reply by
//! [`CompletionClient`], and anything else (history fetch, platform send) is
//! caught here, logged, and answered with a generic apology. Nothing escapes
//! to the caller.

use tracing::{debug, error, info, warn};

use relaycord_core::config::DiscordConfig;
use relaycord_core::{ChannelKey, ConversationFlags, HistoryMessage};

use crate::completion::CompletionClient;
use crate::prompt::build_prompt;

use super::commands::{is_reset_trigger, Command};
use super::context::{HistorySource, InteractionResponder, MessageResponder};
use super::{
    ANALYSIS_HEADER, ANALYZE_ERROR_REPLY, MESSAGE_ERROR_REPLY, NOT_TEXT_CHANNEL_REPLY,
    NO_MESSAGES_REPLY, PONG_REPLY, RESET_REPLY,
};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no valid messages in channel history")]
    EmptyHistory,

    #[error("history fetch failed: {0}")]
    History(String),

    #[error("platform error: {0}")]
    Platform(String),
}

/// What the pipeline did with a plain message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    IgnoredBot,
    Reset,
    NoHistory,
    Replied,
    Failed,
}

/// What the pipeline did with a slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Pong,
    Reset,
    NotTextChannel,
    NoHistory,
    Analyzed,
    Unknown,
    Failed,
}

/// A plain channel message, reduced to what the pipeline needs.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub channel: ChannelKey,
    pub content: String,
    pub author_is_bot: bool,
}

/// Per-deployment knobs for the relay.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub history_limit: u8,
    pub chat_persona: String,
    pub analyze_persona: String,
}

impl RelaySettings {
    pub fn from_config(config: &DiscordConfig) -> Self {
        Self {
            history_limit: config.history_limit,
            chat_persona: config.chat_persona.clone(),
            analyze_persona: config.analyze_persona.clone(),
        }
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self::from_config(&DiscordConfig::default())
    }
}

/// Order platform history oldest-first, drop blank messages, and render
/// `author: text` lines.
pub fn collect_lines(newest_first: Vec<HistoryMessage>) -> Result<Vec<String>, PipelineError> {
    let lines: Vec<String> = newest_first
        .into_iter()
        .rev()
        .filter(|m| !m.is_blank())
        .map(|m| m.to_line())
        .collect();

    if lines.is_empty() {
        return Err(PipelineError::EmptyHistory);
    }
    Ok(lines)
}

/// The relay itself: completion client, settings, and the per-channel flags.
pub struct Relay {
    completion: CompletionClient,
    flags: ConversationFlags,
    settings: RelaySettings,
}

impl Relay {
    pub fn new(completion: CompletionClient, settings: RelaySettings) -> Self {
        Self {
            completion,
            flags: ConversationFlags::new(),
            settings,
        }
    }

    pub fn flags(&self) -> &ConversationFlags {
        &self.flags
    }

    /// Fetch and order the recent history of `channel`.
    pub async fn fetch_lines<H: HistorySource + ?Sized>(
        &self,
        history: &H,
        channel: ChannelKey,
    ) -> Result<Vec<String>, PipelineError> {
        let messages = history
            .recent_messages(channel, self.settings.history_limit)
            .await?;
        debug!(channel = %channel, fetched = messages.len(), "history fetched");
        collect_lines(messages)
    }

    /// Format `lines` with `persona` and run the completion. Never fails.
    pub async fn complete_lines(&self, lines: &[String], persona: &str) -> String {
        let prompt = build_prompt(lines, Some(persona));
        self.completion.complete(&prompt).await
    }

    /// Handle a plain channel message.
    pub async fn on_message<H, R>(
        &self,
        history: &H,
        responder: &R,
        msg: &InboundMessage,
    ) -> MessageOutcome
    where
        H: HistorySource + ?Sized,
        R: MessageResponder + ?Sized,
    {
        if msg.author_is_bot {
            return MessageOutcome::IgnoredBot;
        }

        if is_reset_trigger(&msg.content) {
            self.flags.mark_reset(msg.channel);
            info!(channel = %msg.channel, "context reset via !reset");
            if let Err(e) = responder.reply(RESET_REPLY).await {
                warn!(channel = %msg.channel, error = %e, "failed to confirm reset");
                return MessageOutcome::Failed;
            }
            return MessageOutcome::Reset;
        }

        match self.converse(history, responder, msg.channel).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(channel = %msg.channel, error = %e, "error processing message");
                if let Err(e) = responder.reply(MESSAGE_ERROR_REPLY).await {
                    warn!(channel = %msg.channel, error = %e, "failed to send apology");
                }
                MessageOutcome::Failed
            }
        }
    }

    async fn converse<H, R>(
        &self,
        history: &H,
        responder: &R,
        channel: ChannelKey,
    ) -> Result<MessageOutcome, PipelineError>
    where
        H: HistorySource + ?Sized,
        R: MessageResponder + ?Sized,
    {
        let lines = match self.fetch_lines(history, channel).await {
            Ok(lines) => lines,
            Err(PipelineError::EmptyHistory) => {
                responder.reply(NO_MESSAGES_REPLY).await?;
                return Ok(MessageOutcome::NoHistory);
            }
            Err(e) => return Err(e),
        };

        responder.typing().await?;

        let reply = self
            .complete_lines(&lines, &self.settings.chat_persona)
            .await;
        responder.reply(&reply).await?;

        self.flags.mark_active(channel);
        Ok(MessageOutcome::Replied)
    }

    /// Handle a slash command invoked in `channel`.
    ///
    /// `in_text_channel` is false when the interaction came from somewhere
    /// history cannot be read (only `/analyze` cares).
    pub async fn on_command<H, R>(
        &self,
        history: &H,
        responder: &R,
        name: &str,
        channel: ChannelKey,
        in_text_channel: bool,
    ) -> CommandOutcome
    where
        H: HistorySource + ?Sized,
        R: InteractionResponder + ?Sized,
    {
        let Some(command) = Command::from_name(name) else {
            warn!(command = %name, "unknown command");
            return CommandOutcome::Unknown;
        };

        match command {
            Command::Ping => match responder.reply(PONG_REPLY).await {
                Ok(()) => CommandOutcome::Pong,
                Err(e) => {
                    warn!(command = %name, error = %e, "failed to answer ping");
                    CommandOutcome::Failed
                }
            },
            Command::Reset => {
                self.flags.mark_reset(channel);
                info!(channel = %channel, "context reset via /reset");
                match responder.reply(RESET_REPLY).await {
                    Ok(()) => CommandOutcome::Reset,
                    Err(e) => {
                        warn!(command = %name, error = %e, "failed to confirm reset");
                        CommandOutcome::Failed
                    }
                }
            }
            Command::Analyze => {
                if let Err(e) = responder.defer().await {
                    error!(command = %name, error = %e, "failed to defer reply");
                    return CommandOutcome::Failed;
                }
                match self
                    .analyze(history, responder, channel, in_text_channel)
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(channel = %channel, error = %e, "error in analyze command");
                        if let Err(e) = responder.edit(ANALYZE_ERROR_REPLY).await {
                            warn!(channel = %channel, error = %e, "failed to send apology");
                        }
                        CommandOutcome::Failed
                    }
                }
            }
        }
    }

    async fn analyze<H, R>(
        &self,
        history: &H,
        responder: &R,
        channel: ChannelKey,
        in_text_channel: bool,
    ) -> Result<CommandOutcome, PipelineError>
    where
        H: HistorySource + ?Sized,
        R: InteractionResponder + ?Sized,
    {
        if !in_text_channel {
            responder.edit(NOT_TEXT_CHANNEL_REPLY).await?;
            return Ok(CommandOutcome::NotTextChannel);
        }

        let lines = match self.fetch_lines(history, channel).await {
            Ok(lines) => lines,
            Err(PipelineError::EmptyHistory) => {
                responder.edit(NO_MESSAGES_REPLY).await?;
                return Ok(CommandOutcome::NoHistory);
            }
            Err(e) => return Err(e),
        };

        let response = self
            .complete_lines(&lines, &self.settings.analyze_persona)
            .await;
        responder
            .edit(&format!("{ANALYSIS_HEADER}{response}"))
            .await?;
        Ok(CommandOutcome::Analyzed)
    }
}
