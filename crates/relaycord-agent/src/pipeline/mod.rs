//! Channel-agnostic relay pipeline.
//!
//! Per event: fetch history → format prompt → complete → respond. Channel
//! adapters supply a [`HistorySource`] and a responder; everything else lives
//! here so it can be exercised without a live platform connection.

pub mod commands;
pub mod context;
pub mod process;

pub use commands::{is_reset_trigger, Command};
pub use context::{HistorySource, InteractionResponder, MessageResponder};
pub use process::{
    collect_lines, CommandOutcome, InboundMessage, MessageOutcome, PipelineError, Relay,
    RelaySettings,
};

/// Reply to `/ping`.
pub const PONG_REPLY: &str = "Pong!";
/// Reply to `/reset` and `!reset`.
pub const RESET_REPLY: &str = "Context reset successfully";
/// Reply when the fetched history has no usable text.
pub const NO_MESSAGES_REPLY: &str = "No valid messages found in the channel history.";
/// Prefix on every `/analyze` result.
pub const ANALYSIS_HEADER: &str = "**Gemini Analysis of Last 10 Messages:**\n\n";
/// `/analyze` used somewhere without a text channel.
pub const NOT_TEXT_CHANNEL_REPLY: &str = "This command can only be used in a text channel.";
/// Generic apology after an unexpected failure on a plain message.
pub const MESSAGE_ERROR_REPLY: &str = "Sorry, I encountered an error while processing messages.";
/// Generic apology after an unexpected failure in `/analyze`.
pub const ANALYZE_ERROR_REPLY: &str = "An error occurred while analyzing the messages.";
