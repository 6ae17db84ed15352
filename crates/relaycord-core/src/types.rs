use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform channel identifier (Discord snowflake).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelKey(pub u64);

impl ChannelKey {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChannelKey {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Read-only view of a single channel message, as handed over by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub author: String,
    pub content: String,
}

impl HistoryMessage {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
        }
    }

    /// True when the message carries no text (attachment-only, embeds, etc).
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Prompt line for this message: `{author}: {content}`.
    pub fn to_line(&self) -> String {
        format!("{}: {}", self.author, self.content)
    }
}

/// Per-channel "context was reset" flags.
///
/// Written on every reset and after every answered message. Nothing reads the
/// flag to change behaviour; it is kept in process memory only and the last
/// write wins.
#[derive(Debug, Default)]
pub struct ConversationFlags {
    flags: DashMap<ChannelKey, bool>,
}

impl ConversationFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the channel's context was reset.
    pub fn mark_reset(&self, channel: ChannelKey) {
        self.flags.insert(channel, true);
    }

    /// Record that the channel just had a normal exchange.
    pub fn mark_active(&self, channel: ChannelKey) {
        self.flags.insert(channel, false);
    }

    /// Current flag for a channel, `None` if the channel was never seen.
    pub fn get(&self, channel: ChannelKey) -> Option<bool> {
        self.flags.get(&channel).map(|v| *v)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_last_write_wins() {
        let flags = ConversationFlags::new();
        let ch = ChannelKey(42);
        assert_eq!(flags.get(ch), None);

        flags.mark_reset(ch);
        assert_eq!(flags.get(ch), Some(true));

        flags.mark_active(ch);
        assert_eq!(flags.get(ch), Some(false));

        flags.mark_reset(ch);
        assert_eq!(flags.get(ch), Some(true));
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn flags_are_per_channel() {
        let flags = ConversationFlags::new();
        flags.mark_reset(ChannelKey(1));
        flags.mark_active(ChannelKey(2));
        assert_eq!(flags.get(ChannelKey(1)), Some(true));
        assert_eq!(flags.get(ChannelKey(2)), Some(false));
    }

    #[test]
    fn blank_message_detection() {
        assert!(HistoryMessage::new("a", "").is_blank());
        assert!(HistoryMessage::new("a", "   \n").is_blank());
        assert!(!HistoryMessage::new("a", "hi").is_blank());
        assert_eq!(HistoryMessage::new("A", "hi").to_line(), "A: hi");
    }
}
