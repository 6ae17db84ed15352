//! The bot's command surface: three slash commands plus the `!reset` text
//! trigger for channels where slash commands are unavailable.

/// Registered application commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Analyze,
    Reset,
}

impl Command {
    /// All commands, in registration order.
    pub const ALL: [Command; 3] = [Command::Ping, Command::Analyze, Command::Reset];

    pub fn name(self) -> &'static str {
        match self {
            Command::Ping => "ping",
            Command::Analyze => "analyze",
            Command::Reset => "reset",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::Ping => "Replies with Pong!",
            Command::Analyze => "Analyzes the last 10 messages in the channel using Gemini AI",
            Command::Reset => "Resets the bot's conversation context",
        }
    }

    /// Look up a command by its registered name. Exact match only.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// True when a plain message is the `!reset` trigger (ASCII case-insensitive,
/// no surrounding text).
pub fn is_reset_trigger(content: &str) -> bool {
    content.eq_ignore_ascii_case("!reset")
}
