//! Seams between the pipeline and a chat platform.
//!
//! A channel adapter implements these traits over its SDK handles; tests
//! implement them with in-memory fakes.

use async_trait::async_trait;

use relaycord_core::{ChannelKey, HistoryMessage};

use super::process::PipelineError;

/// Source of recent channel messages.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Up to `limit` most recent messages of `channel`, **newest first**
    /// (the order chat platforms return them in).
    async fn recent_messages(
        &self,
        channel: ChannelKey,
        limit: u8,
    ) -> Result<Vec<HistoryMessage>, PipelineError>;
}

/// Reply surface for a plain channel message.
#[async_trait]
pub trait MessageResponder: Send + Sync {
    /// Show the "bot is typing" indicator.
    async fn typing(&self) -> Result<(), PipelineError>;

    /// Reply to the triggering message.
    async fn reply(&self, text: &str) -> Result<(), PipelineError>;
}

/// Reply surface for a slash-command interaction.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Answer the interaction immediately.
    async fn reply(&self, text: &str) -> Result<(), PipelineError>;

    /// Acknowledge now, answer later with [`InteractionResponder::edit`].
    async fn defer(&self) -> Result<(), PipelineError>;

    /// Replace the deferred placeholder with the final text.
    async fn edit(&self, text: &str) -> Result<(), PipelineError>;
}
