pub mod adapter;
pub mod commands;
pub mod error;
pub mod handler;
pub mod history;
pub mod respond;
pub mod send;

pub use adapter::DiscordAdapter;
pub use error::DiscordError;
