use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::GetMessages;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::id::ChannelId;

use relaycord_agent::pipeline::{HistorySource, PipelineError};
use relaycord_core::{ChannelKey, HistoryMessage};

/// Channel history read over Discord REST.
pub struct ChannelHistory {
    http: Arc<Http>,
}

impl ChannelHistory {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// Author username and raw text of a Discord message.
fn to_history_message(msg: &Message) -> HistoryMessage {
    HistoryMessage::new(msg.author.name.clone(), msg.content.clone())
}

#[async_trait]
impl HistorySource for ChannelHistory {
    async fn recent_messages(
        &self,
        channel: ChannelKey,
        limit: u8,
    ) -> Result<Vec<HistoryMessage>, PipelineError> {
        // Discord returns newest first, which is what the pipeline expects.
        let messages = ChannelId::new(channel.get())
            .messages(&self.http, GetMessages::new().limit(limit))
            .await
            .map_err(|e| PipelineError::History(e.to_string()))?;

        Ok(messages.iter().map(to_history_message).collect())
    }
}
